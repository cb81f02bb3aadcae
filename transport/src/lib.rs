//! Provides an abstraction for the SSH transport layer.
//!
//! The building blocks are a pure packet codec ([`encode`], [`decode`]), the buffering
//! [`PacketEncoder`] and [`PacketDecoder`] for partial writes and reads, the algorithm
//! negotiation message [`KexInit`] and a blocking [`PacketStream`] tying them to a connection.
//!
//! Key exchange cryptography and ciphers are not part of this crate. After a key exchange
//! established the integrity keys, they are installed with
//! [`PacketStream::set_outgoing_mac`] and [`PacketStream::set_incoming_mac`].

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![warn(unreachable_pub)]

pub use kexinit::{name_list, AlgorithmLists, KexInit, FIELD_NAMES};
pub use parser::{decode, PacketDecoder};
pub use stream::PacketStream;
pub use version::VersionInformation;
pub use writer::{encode, encode_with_rng, MacWithKey, PacketEncoder};

mod kexinit;
mod parser;
mod stream;
#[cfg(test)]
mod test_helpers;
mod version;
mod writer;

pub mod constants;
pub mod errors;
pub mod padding_length;

#[cfg(feature = "default-algorithms")]
pub use algorithms::mac::registry as default_mac_registry;

static_assertions::assert_cfg!(
    not(target_pointer_width = "16"),
    "16-bit platforms are not supported by minissh."
);
