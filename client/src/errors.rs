//! Defines all the errors that can occur on the client side.

use std::{io, path::PathBuf};

use definitions::{KeyError, ParseError};
use transport::errors::CommunicationError;

/// The host key of the server could not be verified.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum HostKeyError {
    /// A matching known hosts entry is a `@cert-authority` entry, which needs certificate
    /// validation.
    #[error("certificate authority entries (line {line}) are not supported")]
    NotImplemented {
        /// The line of the entry in its known hosts file.
        line: usize,
    },
}

/// A known hosts file or one of its lines could not be read.
#[derive(Debug, thiserror::Error)]
pub enum KnownHostsError {
    /// The file exists but could not be read.
    #[error("could not read `{}`: {source}", path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// A line lacks a required field.
    #[error("missing {0}")]
    MissingField(&'static str),
    /// A line starts with a marker other than `@revoked` or `@cert-authority`.
    #[error("unknown marker `{0}`")]
    UnknownMarker(String),
    /// The key is not valid base64.
    #[error("invalid base64 key: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// User authentication could not be completed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The connection to the server failed.
    #[error("session failed: {0}")]
    Session(#[from] CommunicationError),
    /// The server rejected all attempted methods.
    #[error("permission denied ({})", methods.join(","))]
    AuthenticationExhausted {
        /// The methods the server was still willing to accept.
        methods: Vec<String>,
    },
    /// The server sent a message that is not expected at this point.
    #[error("unexpected message with number {0}")]
    UnexpectedMessage(u8),
    /// The server sent a message that could not be parsed.
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] ParseError),
    /// The server closed the connection.
    #[error("disconnected by server (reason {reason_code}): {description}")]
    Disconnected {
        /// The reason code of the disconnect message.
        reason_code: u32,
        /// The description the server sent.
        description: String,
    },
    /// A key could not be used to sign the authentication request.
    #[error("key error: {0}")]
    Key(#[from] KeyError),
}
