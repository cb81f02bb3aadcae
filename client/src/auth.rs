//! The client side of user authentication.
//!
//! An [`Authenticator`] first tries public key authentication with each candidate key, then
//! asks for passwords, for as long as the server permits the respective method.

use std::{
    collections::HashSet,
    ffi::OsString,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use definitions::{
    algorithms::{AuthenticationKey, KeyType, KeyTypeRegistry},
    consts::{message_numbers::SSH_MSG_USERAUTH_PK_OK, METHOD_PASSWORD, METHOD_PUBLICKEY},
    KeyError,
};
use log::{debug, info, warn};
use secstr::SecStr;

use crate::{
    errors::AuthError,
    public_key::{blob_key_type, PublicKeyLine},
};

/// The reply of the server to an authentication request.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AuthResponse {
    /// The client is authenticated.
    Success,
    /// The offered public key would be accepted with a signature.
    PublicKeyAccepted,
    /// The request was rejected.
    Failure {
        /// The methods that can continue.
        methods: Vec<String>,
        /// Whether the request succeeded but more authentication is required.
        partial_success: bool,
    },
}

/// The server side of an authentication exchange, as seen by the client.
pub trait AuthSession {
    /// Asks whether the server would accept the public key `blob`.
    fn offer_public_key(&mut self, algorithm: &str, blob: &[u8])
        -> Result<AuthResponse, AuthError>;

    /// Authenticates with a signature made by `key`.
    fn sign_in_with_key(&mut self, key: &dyn AuthenticationKey)
        -> Result<AuthResponse, AuthError>;

    /// Authenticates with a password.
    fn sign_in_with_password(&mut self, password: &[u8]) -> Result<AuthResponse, AuthError>;

    /// Returns the banners received since the last call.
    fn take_banners(&mut self) -> Vec<String>;
}

/// Reads key files.
pub trait KeySource {
    /// Reads the public key file at `path`.
    fn read_public(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads the private key file at `path`.
    fn read_private(&self, path: &Path) -> io::Result<SecStr>;
}

/// Reads key files from the file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsKeySource;

impl KeySource for FsKeySource {
    fn read_public(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn read_private(&self, path: &Path) -> io::Result<SecStr> {
        fs::read(path).map(SecStr::new)
    }
}

/// Asks the user for secrets.
///
/// Each method may block for as long as the user needs.
pub trait Prompter {
    /// Asks for the passphrase of the encrypted private key at `key_path`.
    ///
    /// `None` skips the key.
    fn passphrase(&mut self, key_path: &Path) -> Option<SecStr>;

    /// Asks for the password of `user` at `host`.
    ///
    /// `None` gives up password authentication.
    fn password(&mut self, user: &str, host: &str) -> Option<SecStr>;

    /// Shows a banner the server sent.
    fn banner(&mut self, _text: &str) {}

    /// Tells the user that the last password was rejected.
    fn password_rejected(&mut self) {}
}

/// The state of the authentication.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AuthState {
    /// No method succeeded yet.
    Unauthenticated,
    /// The server accepted the client.
    Authenticated,
    /// All methods were tried without success.
    Exhausted,
}

/// The result of running an [`Authenticator`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AuthOutcome {
    /// The server accepted the client.
    Authenticated,
    /// The server rejected the client. Contains the methods that could still continue.
    Denied(Vec<String>),
}

impl AuthOutcome {
    /// Turns a denial into an [`AuthError::AuthenticationExhausted`].
    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            AuthOutcome::Authenticated => Ok(()),
            AuthOutcome::Denied(methods) => Err(AuthError::AuthenticationExhausted { methods }),
        }
    }
}

/// Drives the client side of user authentication.
pub struct Authenticator<'a> {
    /// The key types private keys can be loaded with.
    key_types: &'a KeyTypeRegistry,
    /// The user to authenticate as.
    user: String,
    /// The host shown when asking for a password.
    host: String,
    /// The current state.
    state: AuthState,
    /// The methods the server permitted in its last failure message.
    ///
    /// `None` until the first failure, which permits every method.
    permitted: Option<Vec<String>>,
    /// The candidate keys that were already tried.
    tried: HashSet<PathBuf>,
}

impl fmt::Debug for Authenticator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("key_types", &self.key_types)
            .field("user", &self.user)
            .field("host", &self.host)
            .field("state", &self.state)
            .field("permitted", &self.permitted)
            .finish_non_exhaustive()
    }
}

impl<'a> Authenticator<'a> {
    /// Creates an authenticator for `user` at `host`.
    pub fn new(
        key_types: &'a KeyTypeRegistry,
        user: impl Into<String>,
        host: impl Into<String>,
    ) -> Authenticator<'a> {
        Authenticator {
            key_types,
            user: user.into(),
            host: host.into(),
            state: AuthState::Unauthenticated,
            permitted: None,
            tried: HashSet::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// The methods the server permitted last, or `None` before the first failure.
    pub fn permitted_methods(&self) -> Option<&[String]> {
        self.permitted.as_deref()
    }

    /// Returns `true` if `method` may still succeed.
    pub fn permits(&self, method: &str) -> bool {
        self.permitted
            .as_ref()
            .map_or(true, |methods| methods.iter().any(|permitted| permitted == method))
    }

    /// Runs authentication until the server accepts the client or no method is left.
    ///
    /// `candidates` are private key file paths in the order they are tried; the public key is
    /// read from the same path with `.pub` appended. Missing or unusable keys are skipped and no
    /// key is tried twice.
    pub fn run<S: AuthSession + ?Sized>(
        &mut self,
        session: &mut S,
        candidates: &[PathBuf],
        key_source: &dyn KeySource,
        prompter: &mut dyn Prompter,
    ) -> Result<AuthOutcome, AuthError> {
        info!("authenticating as {}@{}", self.user, self.host);

        for path in candidates {
            if self.state != AuthState::Unauthenticated || !self.permits(METHOD_PUBLICKEY) {
                break;
            }

            if !self.tried.insert(path.clone()) {
                debug!("{} was already tried", path.display());
                continue;
            }

            if self.try_key(session, path, key_source, prompter)? {
                info!("authentication with {} succeeded", path.display());
                self.state = AuthState::Authenticated;
            }
        }

        while self.state == AuthState::Unauthenticated && self.permits(METHOD_PASSWORD) {
            let password = match prompter.password(&self.user, &self.host) {
                Some(password) => password,
                None => {
                    debug!("no password given");
                    break;
                }
            };

            let response = session.sign_in_with_password(password.unsecure())?;
            forward_banners(session, prompter);

            match response {
                AuthResponse::Success => {
                    info!("authentication with password succeeded");
                    self.state = AuthState::Authenticated;
                }
                AuthResponse::Failure { methods, .. } => {
                    self.update_permitted(methods);
                    prompter.password_rejected();
                }
                AuthResponse::PublicKeyAccepted => {
                    return Err(AuthError::UnexpectedMessage(SSH_MSG_USERAUTH_PK_OK))
                }
            }
        }

        if self.state == AuthState::Unauthenticated {
            self.state = AuthState::Exhausted;
        }

        Ok(self.outcome())
    }

    /// The outcome corresponding to the current state.
    fn outcome(&self) -> AuthOutcome {
        match self.state {
            AuthState::Authenticated => AuthOutcome::Authenticated,
            AuthState::Unauthenticated | AuthState::Exhausted => {
                let methods = self.permitted.clone().unwrap_or_default();

                info!(
                    "{}@{}: permission denied ({})",
                    self.user,
                    self.host,
                    methods.join(",")
                );

                AuthOutcome::Denied(methods)
            }
        }
    }

    /// Remembers the methods the server permits from now on.
    fn update_permitted(&mut self, methods: Vec<String>) {
        debug!("methods that can continue: {}", methods.join(","));

        self.permitted = Some(methods);
    }

    /// Attempts public key authentication with the key at `path`.
    ///
    /// Returns `true` if the client is authenticated.
    fn try_key<S: AuthSession + ?Sized>(
        &mut self,
        session: &mut S,
        path: &Path,
        key_source: &dyn KeySource,
        prompter: &mut dyn Prompter,
    ) -> Result<bool, AuthError> {
        let public_path = public_key_path(path);

        let contents = match key_source.read_public(&public_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{}: no such key", public_path.display());
                return Ok(false);
            }
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                warn!("{}: unreadable file", public_path.display());
                return Ok(false);
            }
            Err(err) => {
                warn!("{}: cannot open file: {}", public_path.display(), err);
                return Ok(false);
            }
        };

        let public_key = match parse_public_key(&contents) {
            Ok(public_key) => public_key,
            Err(err) => {
                warn!("{}: {}", public_path.display(), err);
                return Ok(false);
            }
        };

        let key_types = self.key_types;
        let key_type = match key_types.lookup(&public_key.key_type) {
            Ok(key_type) => key_type,
            Err(_) => {
                warn!(
                    "{}: {}",
                    public_path.display(),
                    KeyError::KeyTypeUnsupported(public_key.key_type)
                );
                return Ok(false);
            }
        };

        debug!("offering public key from {}", public_path.display());

        let response =
            session.offer_public_key(key_type.signature_algorithm(), &public_key.blob)?;
        forward_banners(session, prompter);

        match response {
            AuthResponse::PublicKeyAccepted => {}
            AuthResponse::Success => return Ok(true),
            AuthResponse::Failure { methods, .. } => {
                info!("key in {} is refused", public_path.display());
                self.update_permitted(methods);
                return Ok(false);
            }
        }

        let key = match load_private_key(&**key_type, path, key_source, prompter) {
            Some(key) => key,
            None => return Ok(false),
        };

        if key.public_key_blob() != public_key.blob {
            warn!(
                "{}: private key does not belong to {}",
                path.display(),
                public_path.display()
            );
            return Ok(false);
        }

        let response = session.sign_in_with_key(&*key)?;
        forward_banners(session, prompter);

        match response {
            AuthResponse::Success => Ok(true),
            AuthResponse::Failure { methods, .. } => {
                info!("signature with {} was rejected", path.display());
                self.update_permitted(methods);
                Ok(false)
            }
            AuthResponse::PublicKeyAccepted => {
                Err(AuthError::UnexpectedMessage(SSH_MSG_USERAUTH_PK_OK))
            }
        }
    }
}

/// Returns the path of the public key belonging to the private key at `path`.
fn public_key_path(path: &Path) -> PathBuf {
    let mut public_path = OsString::from(path.as_os_str());
    public_path.push(".pub");

    PathBuf::from(public_path)
}

/// Parses a public key file and checks that the blob is of the declared type.
fn parse_public_key(contents: &[u8]) -> Result<PublicKeyLine, KeyError> {
    let public_key = PublicKeyLine::parse(contents)?;

    match blob_key_type(&public_key.blob) {
        Some(blob_type) if blob_type == public_key.key_type => Ok(public_key),
        Some(blob_type) => Err(KeyError::InvalidKeyFormat(format!(
            "key is declared as `{}`, but is a `{}` key",
            public_key.key_type, blob_type
        ))),
        None => Err(KeyError::InvalidKeyFormat("public key blob lacks its type".into())),
    }
}

/// Reads and decodes the private key at `path`, asking for a passphrase if it is encrypted.
///
/// Failures are logged and result in `None`.
fn load_private_key(
    key_type: &dyn KeyType,
    path: &Path,
    key_source: &dyn KeySource,
    prompter: &mut dyn Prompter,
) -> Option<Box<dyn AuthenticationKey>> {
    debug!("loading private key from {}", path.display());

    let contents = match key_source.read_private(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("{}: cannot read private key: {}", path.display(), err);
            return None;
        }
    };

    let result = key_type.is_encrypted(contents.unsecure()).and_then(|encrypted| {
        if !encrypted {
            return key_type.load_private_key(contents.unsecure(), None);
        }

        match prompter.passphrase(path) {
            Some(passphrase) => {
                key_type.load_private_key(contents.unsecure(), Some(passphrase.unsecure()))
            }
            None => Err(KeyError::PassphraseRequired),
        }
    });

    match result {
        Ok(key) => Some(key),
        Err(err) => {
            warn!("{}: {}", path.display(), err);
            None
        }
    }
}

/// Hands the banners the session received to the prompter.
fn forward_banners<S: AuthSession + ?Sized>(session: &mut S, prompter: &mut dyn Prompter) {
    for banner in session.take_banners() {
        debug!("banner: {}", banner.trim_end());
        prompter.banner(&banner);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use definitions::write;

    use super::*;

    const FAKE: &str = "ssh-fake";
    const ENCRYPTED: &[u8] = b"ENCRYPTED:";
    const PASSPHRASE: &[u8] = b"open sesame";

    /// Keys whose private key file contents are their public blob.
    #[derive(Debug)]
    struct FakeKeyType;

    #[derive(Debug)]
    struct FakeKey(Vec<u8>);

    impl KeyType for FakeKeyType {
        fn name(&self) -> &'static str {
            FAKE
        }

        fn is_encrypted(&self, private_key: &[u8]) -> Result<bool, KeyError> {
            Ok(private_key.starts_with(ENCRYPTED))
        }

        fn load_private_key(
            &self,
            private_key: &[u8],
            passphrase: Option<&[u8]>,
        ) -> Result<Box<dyn AuthenticationKey>, KeyError> {
            let blob = match private_key.strip_prefix(ENCRYPTED) {
                Some(blob) => match passphrase {
                    Some(PASSPHRASE) => blob,
                    Some(_) => return Err(KeyError::InvalidKeyFormat("bad passphrase".into())),
                    None => return Err(KeyError::PassphraseRequired),
                },
                None => private_key,
            };

            if blob_key_type(blob) != Some(FAKE) {
                return Err(KeyError::InvalidKeyFormat("not a fake key".into()));
            }

            Ok(Box::new(FakeKey(blob.to_vec())))
        }
    }

    impl AuthenticationKey for FakeKey {
        fn key_type(&self) -> &'static str {
            FAKE
        }

        fn public_key_blob(&self) -> Vec<u8> {
            self.0.clone()
        }

        fn sign(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
            Ok([&b"sig:"[..], data].concat())
        }
    }

    fn key_types() -> KeyTypeRegistry {
        let mut registry = KeyTypeRegistry::new();
        registry.register(Box::new(FakeKeyType)).unwrap();
        registry
    }

    fn blob(name: &str) -> Vec<u8> {
        typed_blob(FAKE, name)
    }

    fn typed_blob(key_type: &str, name: &str) -> Vec<u8> {
        let mut blob = Vec::new();
        write::string(key_type.as_bytes(), &mut blob).unwrap();
        write::string(name.as_bytes(), &mut blob).unwrap();
        blob
    }

    fn public_line(key_type: &str, blob: &[u8]) -> Vec<u8> {
        format!("{} {} user@host\n", key_type, STANDARD.encode(blob)).into_bytes()
    }

    #[derive(Debug, Default)]
    struct FakeKeySource {
        files: HashMap<PathBuf, Vec<u8>>,
        unreadable: HashSet<PathBuf>,
    }

    impl FakeKeySource {
        fn with_key(mut self, path: &str, public: Vec<u8>, private: Vec<u8>) -> FakeKeySource {
            self.files.insert(PathBuf::from(format!("{}.pub", path)), public);
            self.files.insert(PathBuf::from(path), private);
            self
        }

        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            if self.unreadable.contains(path) {
                return Err(io::ErrorKind::PermissionDenied.into());
            }

            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::ErrorKind::NotFound.into())
        }
    }

    impl KeySource for FakeKeySource {
        fn read_public(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.read(path)
        }

        fn read_private(&self, path: &Path) -> io::Result<SecStr> {
            self.read(path).map(SecStr::new)
        }
    }

    #[derive(Debug, Default)]
    struct FakePrompter {
        passwords: VecDeque<&'static str>,
        passphrase: Option<&'static [u8]>,
        passphrase_requests: Vec<PathBuf>,
        banners: Vec<String>,
        rejections: usize,
    }

    impl Prompter for FakePrompter {
        fn passphrase(&mut self, key_path: &Path) -> Option<SecStr> {
            self.passphrase_requests.push(key_path.to_path_buf());
            self.passphrase.map(|passphrase| SecStr::new(passphrase.to_vec()))
        }

        fn password(&mut self, user: &str, host: &str) -> Option<SecStr> {
            assert_eq!((user, host), ("alice", "example.com"));
            self.passwords
                .pop_front()
                .map(|password| SecStr::new(password.as_bytes().to_vec()))
        }

        fn banner(&mut self, text: &str) {
            self.banners.push(text.to_owned());
        }

        fn password_rejected(&mut self) {
            self.rejections += 1;
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    enum Request {
        Offer(Vec<u8>),
        Sign { blob: Vec<u8>, signature: Vec<u8> },
        Password(Vec<u8>),
    }

    /// Answers requests from a script and records them.
    #[derive(Debug, Default)]
    struct ScriptedSession {
        responses: VecDeque<AuthResponse>,
        requests: Vec<Request>,
        banners: Vec<String>,
    }

    impl ScriptedSession {
        fn new(responses: Vec<AuthResponse>) -> ScriptedSession {
            ScriptedSession {
                responses: responses.into(),
                ..Default::default()
            }
        }

        fn respond(&mut self, request: Request) -> Result<AuthResponse, AuthError> {
            self.requests.push(request);

            Ok(self
                .responses
                .pop_front()
                .expect("no response scripted for request"))
        }
    }

    impl AuthSession for ScriptedSession {
        fn offer_public_key(
            &mut self,
            algorithm: &str,
            blob: &[u8],
        ) -> Result<AuthResponse, AuthError> {
            assert_eq!(algorithm, FAKE);
            self.respond(Request::Offer(blob.to_vec()))
        }

        fn sign_in_with_key(
            &mut self,
            key: &dyn AuthenticationKey,
        ) -> Result<AuthResponse, AuthError> {
            let signature = key.sign(b"session")?;
            self.respond(Request::Sign {
                blob: key.public_key_blob(),
                signature,
            })
        }

        fn sign_in_with_password(&mut self, password: &[u8]) -> Result<AuthResponse, AuthError> {
            self.respond(Request::Password(password.to_vec()))
        }

        fn take_banners(&mut self) -> Vec<String> {
            std::mem::take(&mut self.banners)
        }
    }

    fn failure(methods: &[&str]) -> AuthResponse {
        AuthResponse::Failure {
            methods: methods.iter().map(|&method| method.to_owned()).collect(),
            partial_success: false,
        }
    }

    fn paths(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn refused_key_then_password() {
        let key_types = key_types();
        let source = FakeKeySource::default().with_key(
            "/home/alice/.ssh/id_third",
            public_line(FAKE, &blob("third")),
            blob("third"),
        );
        let mut session = ScriptedSession::new(vec![
            failure(&["publickey", "password"]),
            AuthResponse::Success,
        ]);
        let mut prompter = FakePrompter {
            passwords: vec!["hunter2"].into(),
            ..Default::default()
        };

        let mut authenticator = Authenticator::new(&key_types, "alice", "example.com");
        let outcome = authenticator
            .run(
                &mut session,
                &paths(&[
                    "/home/alice/.ssh/id_first",
                    "/home/alice/.ssh/id_second",
                    "/home/alice/.ssh/id_third",
                ]),
                &source,
                &mut prompter,
            )
            .unwrap();

        assert_eq!(outcome, AuthOutcome::Authenticated);
        assert_eq!(authenticator.state(), AuthState::Authenticated);
        assert_eq!(
            session.requests,
            vec![
                Request::Offer(blob("third")),
                Request::Password(b"hunter2".to_vec())
            ]
        );
        assert!(prompter.passphrase_requests.is_empty());
        assert_eq!(prompter.rejections, 0);
    }

    #[test]
    fn accepted_key_signs() {
        let key_types = key_types();
        let source = FakeKeySource::default().with_key(
            "id",
            public_line(FAKE, &blob("key")),
            [ENCRYPTED, &blob("key")[..]].concat(),
        );
        let mut session =
            ScriptedSession::new(vec![AuthResponse::PublicKeyAccepted, AuthResponse::Success]);
        let mut prompter = FakePrompter {
            passphrase: Some(PASSPHRASE),
            ..Default::default()
        };

        let mut authenticator = Authenticator::new(&key_types, "alice", "example.com");
        let outcome = authenticator
            .run(&mut session, &paths(&["id"]), &source, &mut prompter)
            .unwrap();

        assert_eq!(outcome, AuthOutcome::Authenticated);
        assert_eq!(
            session.requests,
            vec![
                Request::Offer(blob("key")),
                Request::Sign {
                    blob: blob("key"),
                    signature: b"sig:session".to_vec(),
                }
            ]
        );
        assert_eq!(prompter.passphrase_requests, paths(&["id"]));
    }

    #[test]
    fn unencrypted_key_needs_no_passphrase() {
        let key_types = key_types();
        let source =
            FakeKeySource::default().with_key("id", public_line(FAKE, &blob("key")), blob("key"));
        let mut session =
            ScriptedSession::new(vec![AuthResponse::PublicKeyAccepted, AuthResponse::Success]);
        let mut prompter = FakePrompter::default();

        let outcome = Authenticator::new(&key_types, "alice", "example.com")
            .run(&mut session, &paths(&["id"]), &source, &mut prompter)
            .unwrap();

        assert_eq!(outcome, AuthOutcome::Authenticated);
        assert!(prompter.passphrase_requests.is_empty());
    }

    #[test]
    fn unusable_keys_are_skipped() {
        let key_types = key_types();
        let mut source = FakeKeySource::default()
            // Not offered: unsupported key type.
            .with_key("unsupported", public_line("ssh-other", &typed_blob("ssh-other", "x")), Vec::new())
            // Not offered: declared type differs from the blob.
            .with_key("mismatch", b"ssh-fake AAAAB3NzaC1yc2E=\n".to_vec(), Vec::new())
            // Not offered: unreadable public key.
            .with_key("unreadable", public_line(FAKE, &blob("u")), blob("u"))
            // Offered, but the private key is garbage.
            .with_key("garbage", public_line(FAKE, &blob("g")), b"garbage".to_vec())
            // Offered, but no passphrase is given.
            .with_key("locked", public_line(FAKE, &blob("l")), [ENCRYPTED, &blob("l")[..]].concat())
            // Offered, but the private key belongs to another public key.
            .with_key("swapped", public_line(FAKE, &blob("s")), blob("other"))
            .with_key("good", public_line(FAKE, &blob("good")), blob("good"));
        source.unreadable.insert(PathBuf::from("unreadable.pub"));

        let mut session = ScriptedSession::new(vec![
            AuthResponse::PublicKeyAccepted,
            AuthResponse::PublicKeyAccepted,
            AuthResponse::PublicKeyAccepted,
            AuthResponse::PublicKeyAccepted,
            AuthResponse::Success,
        ]);
        let mut prompter = FakePrompter::default();

        let outcome = Authenticator::new(&key_types, "alice", "example.com")
            .run(
                &mut session,
                &paths(&[
                    "unsupported",
                    "mismatch",
                    "unreadable",
                    "garbage",
                    "locked",
                    "swapped",
                    "good",
                ]),
                &source,
                &mut prompter,
            )
            .unwrap();

        assert_eq!(outcome, AuthOutcome::Authenticated);
        assert_eq!(
            session.requests,
            vec![
                Request::Offer(blob("g")),
                Request::Offer(blob("l")),
                Request::Offer(blob("s")),
                Request::Offer(blob("good")),
                Request::Sign {
                    blob: blob("good"),
                    signature: b"sig:session".to_vec(),
                },
            ]
        );
        assert_eq!(prompter.passphrase_requests, paths(&["locked"]));
    }

    #[test]
    fn keys_are_never_retried() {
        let key_types = key_types();
        let source =
            FakeKeySource::default().with_key("id", public_line(FAKE, &blob("key")), blob("key"));
        let mut session = ScriptedSession::new(vec![failure(&["publickey", "password"])]);
        let mut prompter = FakePrompter::default();

        let mut authenticator = Authenticator::new(&key_types, "alice", "example.com");
        let outcome = authenticator
            .run(&mut session, &paths(&["id", "id"]), &source, &mut prompter)
            .unwrap();

        assert_eq!(session.requests, vec![Request::Offer(blob("key"))]);
        assert_eq!(
            outcome,
            AuthOutcome::Denied(vec!["publickey".into(), "password".into()])
        );
        assert_eq!(authenticator.state(), AuthState::Exhausted);
    }

    #[test]
    fn password_not_permitted() {
        let key_types = key_types();
        let source =
            FakeKeySource::default().with_key("id", public_line(FAKE, &blob("key")), blob("key"));
        let mut session = ScriptedSession::new(vec![failure(&["publickey"])]);
        let mut prompter = FakePrompter {
            passwords: vec!["never asked"].into(),
            ..Default::default()
        };

        let outcome = Authenticator::new(&key_types, "alice", "example.com")
            .run(&mut session, &paths(&["id"]), &source, &mut prompter)
            .unwrap();

        assert_eq!(outcome, AuthOutcome::Denied(vec!["publickey".into()]));
        assert_eq!(prompter.passwords.len(), 1);
        assert!(matches!(
            outcome.into_result(),
            Err(AuthError::AuthenticationExhausted { methods }) if methods == vec!["publickey"]
        ));
    }

    #[test]
    fn publickey_not_permitted_after_password_failure() {
        let key_types = key_types();
        let mut session = ScriptedSession::new(vec![
            failure(&["password"]),
            failure(&["password"]),
            AuthResponse::Success,
        ]);
        session.banners.push("Welcome!\n".into());
        let mut prompter = FakePrompter {
            passwords: vec!["wrong", "also wrong", "right"].into(),
            ..Default::default()
        };

        let mut authenticator = Authenticator::new(&key_types, "alice", "example.com");
        let outcome = authenticator
            .run(&mut session, &[], &FakeKeySource::default(), &mut prompter)
            .unwrap();

        assert_eq!(outcome, AuthOutcome::Authenticated);
        assert_eq!(prompter.rejections, 2);
        assert_eq!(prompter.banners, vec!["Welcome!\n".to_owned()]);
        assert_eq!(
            authenticator.permitted_methods(),
            Some(&["password".to_owned()][..])
        );
        assert!(!authenticator.permits("publickey"));
    }

    #[test]
    fn giving_up_password() {
        let key_types = key_types();
        let mut session = ScriptedSession::new(vec![failure(&["publickey", "password"])]);
        let mut prompter = FakePrompter {
            passwords: vec!["wrong"].into(),
            ..Default::default()
        };

        let outcome = Authenticator::new(&key_types, "alice", "example.com")
            .run(&mut session, &[], &FakeKeySource::default(), &mut prompter)
            .unwrap();

        assert_eq!(
            outcome,
            AuthOutcome::Denied(vec!["publickey".into(), "password".into()])
        );
        assert_eq!(prompter.rejections, 1);
    }

    #[test]
    fn public_key_path_appends_suffix() {
        assert_eq!(
            public_key_path(Path::new("/home/alice/.ssh/id_ed25519")),
            PathBuf::from("/home/alice/.ssh/id_ed25519.pub")
        );
        assert_eq!(
            public_key_path(Path::new("key.v2")),
            PathBuf::from("key.v2.pub")
        );
    }
}
