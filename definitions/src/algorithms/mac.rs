//! Defines the `MacAlgorithm` trait.

use std::fmt;

use subtle::ConstantTimeEq as _;

use crate::registry::{Nameable, Registry};

/// A registry of MAC algorithms, keyed by their names.
pub type MacRegistry = Registry<Box<dyn MacAlgorithm>>;

/// Describes a message authentication algorithm.
///
/// Implementations are stateless: the key is passed to every call, so a single instance can be
/// shared by both directions of a connection.
///
/// See [RFC 4253 section 6.4](https://tools.ietf.org/html/rfc4253#section-6.4).
pub trait MacAlgorithm: fmt::Debug + Send + Sync {
    /// The name of the MAC algorithm.
    fn name(&self) -> &'static str;

    /// The size, in bytes, of the produced MAC.
    fn mac_length(&self) -> usize;

    /// The size, in bytes, of the key used for calculating the MAC.
    fn key_length(&self) -> usize;

    /// Computes the MAC of `data` under `key`.
    ///
    /// The result is always `self.mac_length()` bytes long.
    fn compute_mac(&self, key: &[u8], data: &[u8]) -> Vec<u8>;

    /// Checks whether `candidate` is the MAC of `data` under `key`.
    ///
    /// The comparison takes the same time no matter where the first differing byte is.
    fn check_mac(&self, key: &[u8], data: &[u8], candidate: &[u8]) -> bool {
        let computed = self.compute_mac(key, data);

        computed.as_slice().ct_eq(candidate).into()
    }
}

impl Nameable for Box<dyn MacAlgorithm> {
    fn name(&self) -> &str {
        MacAlgorithm::name(&**self)
    }
}
