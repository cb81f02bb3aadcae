//! Provides the key types a client can authenticate itself with.

use definitions::algorithms::{KeyType, KeyTypeRegistry};

#[cfg(any(
    feature = "ssh-ed25519",
    feature = "ssh-rsa",
    feature = "ecdsa-sha2-nistp256",
    feature = "ecdsa-sha2-nistp384"
))]
mod openssh;

#[cfg(feature = "ssh-ed25519")]
mod ed25519;
#[cfg(feature = "ssh-ed25519")]
#[doc(inline)]
pub use self::ed25519::*;

#[cfg(feature = "ssh-rsa")]
mod rsa;
#[cfg(feature = "ssh-rsa")]
#[doc(inline)]
pub use self::rsa::*;

#[cfg(any(feature = "ecdsa-sha2-nistp256", feature = "ecdsa-sha2-nistp384"))]
mod ecdsa;
#[cfg(any(feature = "ecdsa-sha2-nistp256", feature = "ecdsa-sha2-nistp384"))]
#[doc(inline)]
pub use self::ecdsa::*;

/// Returns all the key types defined by this crate.
pub fn key_types() -> Vec<Box<dyn KeyType>> {
    #[allow(unused_mut)]
    let mut result: Vec<Box<dyn KeyType>> = Vec::new();

    #[cfg(feature = "ssh-ed25519")]
    result.push(Box::new(Ed25519));
    #[cfg(feature = "ecdsa-sha2-nistp256")]
    result.push(Box::new(EcdsaNistP256));
    #[cfg(feature = "ecdsa-sha2-nistp384")]
    result.push(Box::new(EcdsaNistP384));
    #[cfg(feature = "ssh-rsa")]
    result.push(Box::new(Rsa::default()));

    result
}

/// Builds a registry holding all the key types defined by this crate.
pub fn registry() -> KeyTypeRegistry {
    let mut registry = KeyTypeRegistry::new();

    for key_type in key_types() {
        registry
            .register(key_type)
            .expect("builtin key types have unique valid names");
    }

    registry
}
