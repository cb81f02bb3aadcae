//! Client settings and their defaults.

use std::{env, path::PathBuf};

use definitions::algorithms::KeyTypeRegistry;

use crate::{
    auth::Authenticator, errors::KnownHostsError, host_key::HostKeyVerifier,
    known_hosts::KnownHostsFile,
};

/// The port SSH servers listen on by default.
pub const DEFAULT_PORT: u16 = 22;

/// The file names of the private keys that are tried by default, relative to `~/.ssh`.
pub const DEFAULT_IDENTITY_FILES: [&str; 4] = ["id_dsa", "id_ecdsa", "id_ed25519", "id_rsa"];

/// The system wide known hosts file.
pub const GLOBAL_KNOWN_HOSTS: &str = "/etc/ssh/ssh_known_hosts";

/// The settings of a client connection.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ClientConfig {
    user: String,
    host: String,
    port: u16,
    identity_files: Vec<PathBuf>,
    known_hosts_files: Vec<PathBuf>,
    strict_host_key_checking: bool,
}

impl Default for ClientConfig {
    /// Connects as the current user to `localhost`, with the keys and known hosts files in
    /// `~/.ssh`.
    fn default() -> ClientConfig {
        let user = env::var("USER")
            .or_else(|_| env::var("LOGNAME"))
            .unwrap_or_default();
        let ssh_dir = dirs::home_dir().map(|home| home.join(".ssh"));

        let identity_files = ssh_dir
            .iter()
            .flat_map(|dir| DEFAULT_IDENTITY_FILES.iter().map(move |name| dir.join(name)))
            .collect();

        let mut known_hosts_files = vec![PathBuf::from(GLOBAL_KNOWN_HOSTS)];
        known_hosts_files.extend(ssh_dir.map(|dir| dir.join("known_hosts")));

        ClientConfig {
            user,
            host: "localhost".to_owned(),
            port: DEFAULT_PORT,
            identity_files,
            known_hosts_files,
            strict_host_key_checking: true,
        }
    }
}

impl ClientConfig {
    /// Sets the user to authenticate as.
    pub fn user(mut self, user: impl Into<String>) -> ClientConfig {
        self.user = user.into();
        self
    }

    /// Sets the server to connect to.
    pub fn host(mut self, host: impl Into<String>) -> ClientConfig {
        self.host = host.into();
        self
    }

    /// Sets the server port.
    pub fn port(mut self, port: u16) -> ClientConfig {
        self.port = port;
        self
    }

    /// Replaces the private key files that are tried, in order.
    pub fn identity_files<P: Into<PathBuf>>(
        mut self,
        files: impl IntoIterator<Item = P>,
    ) -> ClientConfig {
        self.identity_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the known hosts files, in the order they are consulted.
    pub fn known_hosts_files<P: Into<PathBuf>>(
        mut self,
        files: impl IntoIterator<Item = P>,
    ) -> ClientConfig {
        self.known_hosts_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether a revoked host key aborts the connection.
    pub fn strict_host_key_checking(mut self, strict: bool) -> ClientConfig {
        self.strict_host_key_checking = strict;
        self
    }

    /// The user to authenticate as.
    pub fn get_user(&self) -> &str {
        &self.user
    }

    /// The server to connect to.
    pub fn get_host(&self) -> &str {
        &self.host
    }

    /// The server port.
    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// The private key files that are tried.
    pub fn get_identity_files(&self) -> &[PathBuf] {
        &self.identity_files
    }

    /// The known hosts files.
    pub fn get_known_hosts_files(&self) -> &[PathBuf] {
        &self.known_hosts_files
    }

    /// Whether a revoked host key aborts the connection.
    pub fn is_strict(&self) -> bool {
        self.strict_host_key_checking
    }

    /// Reads all known hosts files. Missing files count as empty.
    pub fn load_known_hosts(&self) -> Result<Vec<KnownHostsFile>, KnownHostsError> {
        self.known_hosts_files
            .iter()
            .map(|path| KnownHostsFile::load(path.clone()))
            .collect()
    }

    /// A host key verifier using the configured strictness.
    pub fn host_key_verifier(&self) -> HostKeyVerifier {
        HostKeyVerifier::new(self.strict_host_key_checking)
    }

    /// An authenticator for the configured user and host.
    pub fn authenticator<'a>(&self, key_types: &'a KeyTypeRegistry) -> Authenticator<'a> {
        Authenticator::new(key_types, self.user.clone(), self.host.clone())
    }
}
