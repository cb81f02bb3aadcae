//! Provides the traits implemented by pluggable algorithms.

pub use authentication_key::{AuthenticationKey, KeyType, KeyTypeRegistry};
pub use mac::{MacAlgorithm, MacRegistry};

mod authentication_key;
mod mac;
