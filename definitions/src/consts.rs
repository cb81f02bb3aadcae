//! Constants defined in the SSH RFCs.

pub mod message_numbers;

/// The service name requested before user authentication.
///
/// See [RFC 4252 section 4](https://tools.ietf.org/html/rfc4252#section-4).
pub const SERVICE_USERAUTH: &str = "ssh-userauth";

/// The service started after successful user authentication.
pub const SERVICE_CONNECTION: &str = "ssh-connection";

/// The name of the `none` authentication method.
pub const METHOD_NONE: &str = "none";

/// The name of the `publickey` authentication method.
pub const METHOD_PUBLICKEY: &str = "publickey";

/// The name of the `password` authentication method.
pub const METHOD_PASSWORD: &str = "password";
