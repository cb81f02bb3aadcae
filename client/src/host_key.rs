//! Verification of the server host key against known hosts files.

use log::{debug, trace, warn};

use crate::{
    errors::HostKeyError,
    known_hosts::{KnownHostsFile, Marker},
};

/// The outcome of a host key verification.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VerificationResult {
    /// A known hosts entry vouches for the key.
    Trusted,
    /// The key is revoked and strict checking is enabled. The connection must be aborted.
    Revoked,
    /// No entry matches the host and key.
    Unknown,
}

/// Checks host keys against known hosts files.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct HostKeyVerifier {
    /// Whether a revoked key aborts the connection.
    strict: bool,
}

impl Default for HostKeyVerifier {
    fn default() -> HostKeyVerifier {
        HostKeyVerifier::new(true)
    }
}

impl HostKeyVerifier {
    /// Creates a verifier.
    ///
    /// With `strict` unset, a revoked key only produces a warning and is trusted.
    pub fn new(strict: bool) -> HostKeyVerifier {
        HostKeyVerifier { strict }
    }

    /// Returns `true` if revoked keys abort the connection.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Looks for the key of `hostname` at `port` in `trust_store`.
    ///
    /// The files and their entries are scanned in order and the first entry whose host patterns
    /// match and whose key type and key are equal to the given ones decides the result.
    pub fn verify(
        &self,
        hostname: &str,
        port: u16,
        key_blob: &[u8],
        key_type: &str,
        trust_store: &[KnownHostsFile],
    ) -> Result<VerificationResult, HostKeyError> {
        for file in trust_store {
            debug!("scanning known keys from {}", file.path().display());

            for entry in file.entries() {
                trace!("scanning known key for pattern `{}`", entry.hostname_pattern);

                if !entry.matches_host(hostname, port) {
                    trace!("known key does not match server name");
                    continue;
                }
                if entry.key_type != key_type || entry.key_blob != key_blob {
                    trace!("keys do not match");
                    continue;
                }

                match entry.marker {
                    Some(Marker::Revoked) => {
                        warn!(
                            "\n\
                             @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@\n\
                             @       WARNING: REVOKED HOST KEY DETECTED!               @\n\
                             @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@\n\
                             The {} host key for {} is marked as revoked \
                             ({}:{}).\n\
                             This could mean that a stolen key is being used to \
                             impersonate this host.",
                            key_type,
                            hostname,
                            file.path().display(),
                            entry.line
                        );

                        if self.strict {
                            warn!(
                                "{} host key for {} was revoked and strict checking is enabled",
                                key_type, hostname
                            );

                            return Ok(VerificationResult::Revoked);
                        }
                    }
                    Some(Marker::CertAuthority) => {
                        return Err(HostKeyError::NotImplemented { line: entry.line });
                    }
                    None => {}
                }

                debug!(
                    "{} matches known host entry at {}:{}",
                    hostname,
                    file.path().display(),
                    entry.line
                );

                return Ok(VerificationResult::Trusted);
            }
        }

        debug!("no known host entry for {}", hostname);

        Ok(VerificationResult::Unknown)
    }
}
