//! Message numbers used by the transport and user authentication protocols.
//!
//! See [RFC 4250 section 4.1](https://tools.ietf.org/html/rfc4250#section-4.1).

/// This message causes immediate termination of the connection.
pub const SSH_MSG_DISCONNECT: u8 = 1;

/// All implementations must understand and ignore this message at any time.
pub const SSH_MSG_IGNORE: u8 = 2;

/// The message is used for debugging purposes and may be ignored.
pub const SSH_MSG_DEBUG: u8 = 4;

/// The message is a service request by the client.
pub const SSH_MSG_SERVICE_REQUEST: u8 = 5;

/// The message indicates that the server accepted the service request.
pub const SSH_MSG_SERVICE_ACCEPT: u8 = 6;

/// The message starts the algorithm negotiation.
pub const SSH_MSG_KEXINIT: u8 = 20;

/// The message initiates a new user authentication.
pub const SSH_MSG_USERAUTH_REQUEST: u8 = 50;

/// The message indicates a failure to authenticate the user using the given method.
pub const SSH_MSG_USERAUTH_FAILURE: u8 = 51;

/// The message indicates successful user authentication.
pub const SSH_MSG_USERAUTH_SUCCESS: u8 = 52;

/// The message contains a banner to be displayed to the user during authentication.
pub const SSH_MSG_USERAUTH_BANNER: u8 = 53;

/// The server accepts the offered public key and expects a signature.
///
/// See [RFC 4252 section 7](https://tools.ietf.org/html/rfc4252#section-7).
pub const SSH_MSG_USERAUTH_PK_OK: u8 = 60;
