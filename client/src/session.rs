//! User authentication over a packet stream.

use std::io::{Read, Write};

use definitions::{
    algorithms::AuthenticationKey,
    consts::{message_numbers::SSH_MSG_USERAUTH_PK_OK, SERVICE_USERAUTH},
    Compose,
};
use log::{debug, trace};
use transport::PacketStream;

use crate::{
    auth::{AuthResponse, AuthSession},
    errors::AuthError,
    messages::{publickey_signed_data, Method, ServerMessage, ServiceRequest, UserauthRequest},
};

/// Performs user authentication over a [`PacketStream`] whose key exchange has completed.
///
/// The `ssh-userauth` service is requested before the first authentication request.
#[derive(Debug)]
pub struct PacketAuthSession<S> {
    /// The connection to the server.
    stream: PacketStream<S>,
    /// The exchange hash of the first key exchange.
    session_id: Vec<u8>,
    /// The user to authenticate as.
    user: String,
    /// Whether the server accepted the service request.
    service_accepted: bool,
    /// Banners that were not yet handed out.
    banners: Vec<String>,
}

impl<S: Read + Write> PacketAuthSession<S> {
    /// Creates a session authenticating `user` on `stream`.
    pub fn new(stream: PacketStream<S>, session_id: &[u8], user: impl Into<String>) -> Self {
        PacketAuthSession {
            stream,
            session_id: session_id.to_vec(),
            user: user.into(),
            service_accepted: false,
            banners: Vec::new(),
        }
    }

    /// Requests the `ssh-userauth` service, unless that already happened.
    pub fn request_service(&mut self) -> Result<(), AuthError> {
        if self.service_accepted {
            return Ok(());
        }

        debug!("requesting service {}", SERVICE_USERAUTH);
        self.stream.send_payload(
            &ServiceRequest {
                service: SERVICE_USERAUTH,
            }
            .compose_to_vec(),
        )?;

        match self.next_message()? {
            ServerMessage::ServiceAccept(service) if service == SERVICE_USERAUTH => {
                self.service_accepted = true;
                Ok(())
            }
            message => Err(unexpected(&message)),
        }
    }

    /// Sends a `none` request, which tells the methods the server permits.
    ///
    /// Some servers accept a user without authentication, resulting in
    /// [`AuthResponse::Success`].
    pub fn query_methods(&mut self) -> Result<AuthResponse, AuthError> {
        self.request(Method::None)
    }

    /// Returns the underlying packet stream.
    pub fn into_stream(self) -> PacketStream<S> {
        self.stream
    }

    /// Sends an authentication request and classifies the reply.
    fn request(&mut self, method: Method) -> Result<AuthResponse, AuthError> {
        self.request_service()?;

        trace!("sending authentication request {:?}", method);
        self.stream
            .send_payload(&UserauthRequest::new(&self.user, method).compose_to_vec())?;

        match self.next_message()? {
            ServerMessage::Success => Ok(AuthResponse::Success),
            ServerMessage::Failure {
                methods,
                partial_success,
            } => Ok(AuthResponse::Failure {
                methods,
                partial_success,
            }),
            ServerMessage::PkOk {
                ref algorithm,
                ref blob,
            } => match method {
                Method::PublicKeyQuery {
                    algorithm: offered_algorithm,
                    blob: offered_blob,
                } if algorithm == offered_algorithm && blob[..] == offered_blob[..] => {
                    Ok(AuthResponse::PublicKeyAccepted)
                }
                _ => {
                    debug!("server accepted a key that was not offered");
                    Err(AuthError::UnexpectedMessage(SSH_MSG_USERAUTH_PK_OK))
                }
            },
            message => Err(unexpected(&message)),
        }
    }

    /// Receives the next message that is not a banner or ignored.
    fn next_message(&mut self) -> Result<ServerMessage, AuthError> {
        loop {
            match ServerMessage::parse(&self.stream.recv_payload()?)? {
                ServerMessage::Ignored => trace!("ignoring message"),
                ServerMessage::Banner { message, .. } => {
                    debug!("received banner");
                    self.banners.push(message);
                }
                message => return Ok(message),
            }
        }
    }
}

/// The error for a message that does not fit the current request.
fn unexpected(message: &ServerMessage) -> AuthError {
    AuthError::UnexpectedMessage(message.message_number())
}

impl<S: Read + Write> AuthSession for PacketAuthSession<S> {
    fn offer_public_key(
        &mut self,
        algorithm: &str,
        blob: &[u8],
    ) -> Result<AuthResponse, AuthError> {
        self.request(Method::PublicKeyQuery { algorithm, blob })
    }

    fn sign_in_with_key(
        &mut self,
        key: &dyn AuthenticationKey,
    ) -> Result<AuthResponse, AuthError> {
        let algorithm = key.signature_algorithm();
        let blob = key.public_key_blob();
        let signature =
            key.sign(&publickey_signed_data(&self.session_id, &self.user, algorithm, &blob))?;

        self.request(Method::PublicKeySigned {
            algorithm,
            blob: &blob,
            signature: &signature,
        })
    }

    fn sign_in_with_password(&mut self, password: &[u8]) -> Result<AuthResponse, AuthError> {
        self.request(Method::Password(password))
    }

    fn take_banners(&mut self) -> Vec<String> {
        std::mem::take(&mut self.banners)
    }
}
