//! Defines the traits for keys a client authenticates itself with.

use std::fmt;

use crate::{
    errors::KeyError,
    registry::{Nameable, Registry},
};

/// A registry of key types, keyed by their public key algorithm names.
pub type KeyTypeRegistry = Registry<Box<dyn KeyType>>;

/// A public key algorithm that can load private keys for user authentication.
///
/// See [RFC 4252 section 7](https://tools.ietf.org/html/rfc4252#section-7).
pub trait KeyType: fmt::Debug + Send + Sync {
    /// The public key algorithm name, as used in key files and on the wire.
    fn name(&self) -> &'static str;

    /// The algorithm name used in authentication requests with keys of this type.
    ///
    /// This differs from [`KeyType::name`] when one key type signs with several algorithms,
    /// like "ssh-rsa" keys signing with "rsa-sha2-512".
    fn signature_algorithm(&self) -> &'static str {
        self.name()
    }

    /// Returns `true` if the given private key file contents are protected by a passphrase.
    fn is_encrypted(&self, private_key: &[u8]) -> Result<bool, KeyError>;

    /// Loads a private key from the contents of a private key file.
    ///
    /// `passphrase` is only consulted for encrypted keys. An encrypted key without a passphrase
    /// fails with [`KeyError::PassphraseRequired`].
    fn load_private_key(
        &self,
        private_key: &[u8],
        passphrase: Option<&[u8]>,
    ) -> Result<Box<dyn AuthenticationKey>, KeyError>;
}

/// A loaded private key.
pub trait AuthenticationKey: fmt::Debug + Send + Sync {
    /// The public key algorithm name of this key.
    fn key_type(&self) -> &'static str;

    /// The algorithm name of the signatures produced by [`AuthenticationKey::sign`].
    fn signature_algorithm(&self) -> &'static str {
        self.key_type()
    }

    /// The public key in SSH wire encoding.
    fn public_key_blob(&self) -> Vec<u8>;

    /// Signs `data`, returning the signature in SSH wire encoding.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, KeyError>;
}

impl Nameable for Box<dyn KeyType> {
    fn name(&self) -> &str {
        KeyType::name(&**self)
    }
}
