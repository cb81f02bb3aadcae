//! Provides the algorithm implementations used by the minissh client.

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![warn(unreachable_pub)]

pub mod authentication_key;
pub mod mac;
