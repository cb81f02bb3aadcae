//! Provides the MAC algorithms used by the SSH transport layer.

use definitions::algorithms::{MacAlgorithm, MacRegistry};

#[cfg(any(
    feature = "hmac-sha1",
    feature = "hmac-sha2-256",
    feature = "hmac-sha2-512"
))]
#[doc(hidden)]
mod hmac_sha;
#[cfg(any(
    feature = "hmac-sha1",
    feature = "hmac-sha2-256",
    feature = "hmac-sha2-512"
))]
#[doc(inline)]
pub use self::hmac_sha::*;

/// The message authentication algorithm that does not authenticate.
///
/// It is in effect until the first key exchange completes.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct None;

impl MacAlgorithm for None {
    fn name(&self) -> &'static str {
        "none"
    }

    fn mac_length(&self) -> usize {
        0
    }

    fn key_length(&self) -> usize {
        0
    }

    fn compute_mac(&self, _key: &[u8], _data: &[u8]) -> Vec<u8> {
        Vec::new()
    }
}

/// Returns all the MAC algorithms defined by this crate.
pub fn algorithms() -> Vec<Box<dyn MacAlgorithm>> {
    let mut result: Vec<Box<dyn MacAlgorithm>> = Vec::new();

    // This is the same order used by OpenSSH
    #[cfg(feature = "hmac-sha2-256")]
    result.push(Box::new(HmacSha2256));

    #[cfg(feature = "hmac-sha2-512")]
    result.push(Box::new(HmacSha2512));

    #[cfg(feature = "hmac-sha1")]
    result.push(Box::new(HmacSha1));

    result.push(Box::new(None));

    result
}

/// Builds a registry holding all the MAC algorithms defined by this crate.
pub fn registry() -> MacRegistry {
    let mut registry = MacRegistry::new();

    for algorithm in algorithms() {
        registry
            .register(algorithm)
            .expect("builtin MAC algorithms have unique valid names");
    }

    registry
}
