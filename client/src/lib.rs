//! The client side of an SSH connection after the transport is established.
//!
//! [`HostKeyVerifier`] decides whether the host key a server presented is trusted by consulting
//! [`KnownHostsFile`]s. An [`Authenticator`] then drives user authentication over any
//! [`AuthSession`], usually a [`PacketAuthSession`] on top of a [`transport::PacketStream`].
//! [`ClientConfig`] bundles the settings with the usual OpenSSH defaults.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![warn(unreachable_pub)]

pub use auth::{
    AuthOutcome, AuthResponse, AuthSession, AuthState, Authenticator, FsKeySource, KeySource,
    Prompter,
};
pub use config::ClientConfig;
pub use host_key::{HostKeyVerifier, VerificationResult};
pub use known_hosts::{KnownHostEntry, KnownHostsFile, Marker};
pub use public_key::PublicKeyLine;
pub use session::PacketAuthSession;

mod auth;
mod host_key;
mod session;

pub mod config;
pub mod errors;
pub mod known_hosts;
pub mod messages;
pub mod public_key;

#[cfg(feature = "default-algorithms")]
pub use algorithms::authentication_key::registry as default_key_types;
