//! Defines all the errors that can occur in the transport layer.

pub use definitions::ParseError;

use std::io;

/// A binary packet could not be decoded.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum PacketError {
    /// The input ends before the header or the declared packet and its MAC are complete.
    #[error("packet truncated: {needed} bytes needed, {available} available")]
    TruncatedPacket {
        /// The number of bytes needed to make progress.
        needed: usize,
        /// The number of bytes that were available.
        available: usize,
    },
    /// The length fields of the packet violate the binary packet protocol.
    #[error("malformed packet: {0}")]
    MalformedPacket(&'static str),
    /// The received MAC does not authenticate the packet.
    #[error("computed MAC does not match received MAC")]
    MacMismatch,
    /// The payload is too large to be sent in a single packet.
    #[error("payload of {payload_len} bytes does not fit into a packet")]
    PayloadTooLarge {
        /// The size of the rejected payload.
        payload_len: usize,
    },
}

/// An algorithm negotiation message could not be decoded.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum KexInitError {
    /// The payload does not start with `SSH_MSG_KEXINIT`.
    #[error("payload is not a key exchange init message")]
    NotAKexInitMessage,
    /// The named field runs past the end of the payload.
    #[error("key exchange init message truncated in field `{field}`")]
    TruncatedField {
        /// The field that could not be read completely.
        field: &'static str,
    },
}

/// There was an error during communication.
#[derive(Debug, thiserror::Error)]
pub enum CommunicationError {
    /// The input reached its end.
    ///
    /// No more packets will be received after this error.
    #[error("end of input reached")]
    EndOfInput,
    /// There was an IO error while sending or receiving data.
    #[error("an io error occured: {0}")]
    Io(#[from] io::Error),
    /// A received packet could not be decoded.
    #[error("invalid packet received: {0}")]
    Packet(#[from] PacketError),
    /// The version exchange failed.
    #[error("version exchange failed: {0}")]
    Version(#[from] VersionExchangeError),
}

/// The identification line of the other party was unacceptable.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum VersionExchangeError {
    /// The identification line is not of the form `SSH-protoversion-softwareversion`.
    #[error("invalid identification line")]
    InvalidIdentification,
    /// The identification line or the lines before it were too long or too many.
    #[error("identification line not found within the allowed length")]
    TooLong,
    /// The other party speaks a protocol version other than 2.0.
    #[error("the ssh version used by the other party (`{0}`) is not supported")]
    UnsupportedProtocolVersion(String),
}

/// The software version was illegal according to RFC 4253 section 4.2.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IllegalVersionError {
    /// The proposed version contained a non-ascii character.
    #[error("the version can only contain ascii characters")]
    NonAscii(usize),
    /// The proposed version contained a whitespace character.
    #[error("the version cannot contain whitespace characters")]
    Whitespace(usize),
    /// The proposed version contained a non printable character.
    #[error("the version can only contain printable characters")]
    NonPrintable(usize),
    /// The proposed version contained the `'-'` character.
    #[error("the version cannot contain the '-' character")]
    Minus(usize),
}
