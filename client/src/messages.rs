//! The messages of the user authentication protocol.
//!
//! See [RFC 4252](https://tools.ietf.org/html/rfc4252).

use std::io::{self, Write};

use definitions::{
    consts::{
        message_numbers::{
            SSH_MSG_DEBUG, SSH_MSG_DISCONNECT, SSH_MSG_IGNORE, SSH_MSG_SERVICE_ACCEPT,
            SSH_MSG_SERVICE_REQUEST, SSH_MSG_USERAUTH_BANNER, SSH_MSG_USERAUTH_FAILURE,
            SSH_MSG_USERAUTH_PK_OK, SSH_MSG_USERAUTH_REQUEST, SSH_MSG_USERAUTH_SUCCESS,
        },
        METHOD_NONE, METHOD_PASSWORD, METHOD_PUBLICKEY, SERVICE_CONNECTION,
    },
    parse, write, Compose, ParsedValue,
};

use crate::errors::AuthError;

/// An `SSH_MSG_SERVICE_REQUEST` message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ServiceRequest<'a> {
    /// The requested service.
    pub service: &'a str,
}

impl Compose for ServiceRequest<'_> {
    fn compose(&self, output: &mut impl Write) -> io::Result<()> {
        write::byte(SSH_MSG_SERVICE_REQUEST, output)?;
        write::string(self.service.as_bytes(), output)
    }
}

/// The method specific part of an `SSH_MSG_USERAUTH_REQUEST`.
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum Method<'a> {
    /// Asks for the methods that can continue.
    None,
    /// Asks whether a public key would be accepted, without a signature.
    PublicKeyQuery {
        /// The public key algorithm.
        algorithm: &'a str,
        /// The public key blob.
        blob: &'a [u8],
    },
    /// Authenticates with a signature.
    PublicKeySigned {
        /// The public key algorithm.
        algorithm: &'a str,
        /// The public key blob.
        blob: &'a [u8],
        /// The signature over [`publickey_signed_data`].
        signature: &'a [u8],
    },
    /// Authenticates with a password.
    Password(&'a [u8]),
}

impl std::fmt::Debug for Method<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Method::None => f.write_str("None"),
            Method::PublicKeyQuery { algorithm, .. } => f
                .debug_struct("PublicKeyQuery")
                .field("algorithm", algorithm)
                .finish_non_exhaustive(),
            Method::PublicKeySigned { algorithm, .. } => f
                .debug_struct("PublicKeySigned")
                .field("algorithm", algorithm)
                .finish_non_exhaustive(),
            Method::Password(_) => f.write_str("Password(..)"),
        }
    }
}

/// An `SSH_MSG_USERAUTH_REQUEST` message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct UserauthRequest<'a> {
    /// The user name to authenticate as.
    pub user: &'a str,
    /// The service to start after authentication.
    pub service: &'a str,
    /// The authentication method and its data.
    pub method: Method<'a>,
}

impl<'a> UserauthRequest<'a> {
    /// Creates a request for the `ssh-connection` service.
    pub fn new(user: &'a str, method: Method<'a>) -> UserauthRequest<'a> {
        UserauthRequest {
            user,
            service: SERVICE_CONNECTION,
            method,
        }
    }
}

impl Compose for UserauthRequest<'_> {
    fn compose(&self, output: &mut impl Write) -> io::Result<()> {
        write::byte(SSH_MSG_USERAUTH_REQUEST, output)?;
        write::string(self.user.as_bytes(), output)?;
        write::string(self.service.as_bytes(), output)?;

        match self.method {
            Method::None => write::string(METHOD_NONE.as_bytes(), output),
            Method::PublicKeyQuery { algorithm, blob } => {
                write::string(METHOD_PUBLICKEY.as_bytes(), output)?;
                write::boolean(false, output)?;
                write::string(algorithm.as_bytes(), output)?;
                write::string(blob, output)
            }
            Method::PublicKeySigned {
                algorithm,
                blob,
                signature,
            } => {
                write::string(METHOD_PUBLICKEY.as_bytes(), output)?;
                write::boolean(true, output)?;
                write::string(algorithm.as_bytes(), output)?;
                write::string(blob, output)?;
                write::string(signature, output)
            }
            Method::Password(password) => {
                write::string(METHOD_PASSWORD.as_bytes(), output)?;
                write::boolean(false, output)?;
                write::string(password, output)
            }
        }
    }
}

/// Returns the data a client signs for public key authentication.
///
/// See [RFC 4252 section 7](https://tools.ietf.org/html/rfc4252#section-7).
pub fn publickey_signed_data(
    session_id: &[u8],
    user: &str,
    algorithm: &str,
    blob: &[u8],
) -> Vec<u8> {
    let mut data = Vec::new();

    // The same fields as a signed request, up to the signature.
    write::string(session_id, &mut data).expect("vec write cannot error");
    write::byte(SSH_MSG_USERAUTH_REQUEST, &mut data).expect("vec write cannot error");
    write::string(user.as_bytes(), &mut data).expect("vec write cannot error");
    write::string(SERVICE_CONNECTION.as_bytes(), &mut data).expect("vec write cannot error");
    write::string(METHOD_PUBLICKEY.as_bytes(), &mut data).expect("vec write cannot error");
    write::boolean(true, &mut data).expect("vec write cannot error");
    write::string(algorithm.as_bytes(), &mut data).expect("vec write cannot error");
    write::string(blob, &mut data).expect("vec write cannot error");

    data
}

/// A message the server sends during user authentication.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ServerMessage {
    /// `SSH_MSG_SERVICE_ACCEPT` with the accepted service.
    ServiceAccept(String),
    /// `SSH_MSG_USERAUTH_FAILURE`.
    Failure {
        /// The methods that can continue.
        methods: Vec<String>,
        /// Whether the request succeeded but more authentication is required.
        partial_success: bool,
    },
    /// `SSH_MSG_USERAUTH_SUCCESS`.
    Success,
    /// `SSH_MSG_USERAUTH_BANNER`.
    Banner {
        /// The text to display.
        message: String,
        /// The language tag of the message.
        language: String,
    },
    /// `SSH_MSG_USERAUTH_PK_OK`: the queried public key would be accepted.
    PkOk {
        /// The public key algorithm from the query.
        algorithm: String,
        /// The public key blob from the query.
        blob: Vec<u8>,
    },
    /// `SSH_MSG_IGNORE` or `SSH_MSG_DEBUG`.
    Ignored,
}

impl ServerMessage {
    /// The message number this message was received with.
    ///
    /// Ignored messages report `SSH_MSG_IGNORE`.
    pub fn message_number(&self) -> u8 {
        match self {
            ServerMessage::ServiceAccept(_) => SSH_MSG_SERVICE_ACCEPT,
            ServerMessage::Failure { .. } => SSH_MSG_USERAUTH_FAILURE,
            ServerMessage::Success => SSH_MSG_USERAUTH_SUCCESS,
            ServerMessage::Banner { .. } => SSH_MSG_USERAUTH_BANNER,
            ServerMessage::PkOk { .. } => SSH_MSG_USERAUTH_PK_OK,
            ServerMessage::Ignored => SSH_MSG_IGNORE,
        }
    }

    /// Parses a packet payload.
    ///
    /// A disconnect message results in [`AuthError::Disconnected`], message numbers that have no
    /// meaning during authentication in [`AuthError::UnexpectedMessage`].
    pub fn parse(payload: &[u8]) -> Result<ServerMessage, AuthError> {
        let ParsedValue {
            value: message_number,
            rest_input,
        } = parse::byte(payload)?;

        let message = match message_number {
            SSH_MSG_SERVICE_ACCEPT => {
                ServerMessage::ServiceAccept(parse::utf8_string(rest_input)?.value.to_owned())
            }
            SSH_MSG_USERAUTH_FAILURE => {
                let ParsedValue {
                    value: methods,
                    rest_input,
                } = parse::name_list::<&str>(rest_input)?;
                let partial_success = parse::boolean(rest_input)?.value;

                ServerMessage::Failure {
                    methods: methods.into_iter().map(str::to_owned).collect(),
                    partial_success,
                }
            }
            SSH_MSG_USERAUTH_SUCCESS => ServerMessage::Success,
            SSH_MSG_USERAUTH_BANNER => {
                let ParsedValue {
                    value: message,
                    rest_input,
                } = parse::utf8_string(rest_input)?;
                let language = parse::utf8_string(rest_input)?.value;

                ServerMessage::Banner {
                    message: message.to_owned(),
                    language: language.to_owned(),
                }
            }
            SSH_MSG_USERAUTH_PK_OK => {
                let ParsedValue {
                    value: algorithm,
                    rest_input,
                } = parse::utf8_string(rest_input)?;
                let blob = parse::string(rest_input)?.value;

                ServerMessage::PkOk {
                    algorithm: algorithm.to_owned(),
                    blob: blob.to_vec(),
                }
            }
            SSH_MSG_IGNORE | SSH_MSG_DEBUG => ServerMessage::Ignored,
            SSH_MSG_DISCONNECT => {
                let ParsedValue {
                    value: reason_code,
                    rest_input,
                } = parse::uint32(rest_input)?;
                let description = parse::string(rest_input)?.value;

                return Err(AuthError::Disconnected {
                    reason_code,
                    description: String::from_utf8_lossy(description).into_owned(),
                });
            }
            other => return Err(AuthError::UnexpectedMessage(other)),
        };

        Ok(message)
    }
}
