//! Maps definitions from the SSH RFCs into the Rust type system.
//!
//! This includes
//! - constants defined in the RFCs ([`consts`] module)
//! - parsers and writers for the basic data types in SSH packets ([`parse`] and [`mod@write`]
//!   modules)
//! - the traits pluggable algorithms implement ([`algorithms`] module)
//! - a name-keyed [`Registry`] to hold those algorithms

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![warn(unreachable_pub)]

pub use errors::{InvalidNameError, KeyError, RegistryError};
pub use parse::{ParseError, ParsedValue};
pub use registry::{Nameable, Registry};
pub use write::Compose;

pub mod algorithms;
pub mod consts;
pub mod errors;
pub mod parse;
pub mod registry;
pub mod write;

/// An implementation detail to allow using trait objects that implement `RngCore` and `CryptoRng`.
pub trait CryptoRngCore: rand::RngCore + rand::CryptoRng {}

impl<T: rand::RngCore + rand::CryptoRng> CryptoRngCore for T {}
