//! Errors shared by all crates that build on these definitions.

/// An error while adding to or looking up in a [`Registry`](crate::registry::Registry).
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum RegistryError {
    /// An entry with the same name was already registered.
    #[error("algorithm `{0}` is already registered")]
    DuplicateAlgorithm(String),
    /// No entry with the requested name is registered.
    #[error("algorithm `{0}` is not registered")]
    UnknownAlgorithm(String),
    /// The entry name does not follow the SSH naming rules.
    #[error("`{name}` is not a valid algorithm name: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: InvalidNameError,
    },
}

/// Contains the reason why an algorithm name is invalid.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum InvalidNameError {
    /// The name was empty.
    #[error("algorithm name was empty")]
    EmptyName,
    /// The name was longer than 64 characters.
    #[error("algorithm name was too long")]
    TooLong,
    /// The name contained more than one `'@'` character.
    #[error("algorithm name contained too many '@' symbols")]
    TooManyAtSymbols,
    /// The name contained a comma.
    #[error("algorithm name contained the ',' character")]
    CommaUsed,
    /// The name contained the given non ascii character.
    #[error("algorithm name contained a non ascii character: {0:?}")]
    NonAscii(char),
    /// The name contained the given whitespace character.
    #[error("algorithm name contained a whitespace character")]
    Whitespace(char),
    /// The name contained the given non printable character.
    #[error("algorithm name contained a non printable character")]
    NonPrintable(char),
    /// The part after the `'@'` is not a valid domain.
    #[error("algorithm name contained an invalid domain")]
    InvalidDomain,
}

/// An error while loading or using an authentication key.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum KeyError {
    /// The key type is not known to the key type registry.
    #[error("key type `{0}` is not supported")]
    KeyTypeUnsupported(String),
    /// The key material could not be parsed.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),
    /// The private key is encrypted and no passphrase was given.
    #[error("the private key is encrypted and requires a passphrase")]
    PassphraseRequired,
    /// The signature could not be produced.
    #[error("signing failed: {0}")]
    Signing(String),
}
