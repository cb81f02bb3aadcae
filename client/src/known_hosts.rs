//! Parsing and matching of OpenSSH known hosts files.
//!
//! Each line has the format
//!
//! ```text
//! [@marker] host-patterns key-type base64-key [comment]
//! ```
//!
//! Host patterns are comma separated and may be
//! - plain names such as `example.com`, or `[example.com]:2222` for ports other than 22
//! - globs using `*` and `?`, such as `*.example.com`
//! - negated with `!`, which excludes the host even if another pattern includes it
//! - hashed as `|1|salt|hash`, the base64 HMAC-SHA1 of the host keyed with the salt
//!
//! See the `SSH_KNOWN_HOSTS FILE FORMAT` section of `sshd(8)`.

use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac as _};
use log::{debug, trace, warn};
use sha1::Sha1;
use subtle::ConstantTimeEq as _;

use crate::{
    errors::KnownHostsError,
    public_key::{blob_key_type, split_field},
};

/// The port that is written without brackets.
const DEFAULT_PORT: u16 = 22;

/// The prefix of hashed host names.
const HASHED_PREFIX: &str = "|1|";

/// A marker in front of a known hosts entry.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Marker {
    /// `@cert-authority`: the key is a certificate authority for the matching hosts.
    CertAuthority,
    /// `@revoked`: the key must never be accepted.
    Revoked,
}

/// One line of a known hosts file.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct KnownHostEntry {
    /// The marker of the entry, if any.
    pub marker: Option<Marker>,
    /// The comma separated host patterns.
    pub hostname_pattern: String,
    /// The declared public key algorithm.
    pub key_type: String,
    /// The public key in SSH wire encoding.
    pub key_blob: Vec<u8>,
    /// The comment after the key, if any.
    pub comment: Option<String>,
    /// The line number of the entry, starting at 1.
    pub line: usize,
}

impl KnownHostEntry {
    /// Returns `true` if the host patterns of this entry match `hostname` at `port`.
    pub fn matches_host(&self, hostname: &str, port: u16) -> bool {
        host_pattern_matches(&self.hostname_pattern, hostname, port)
    }
}

/// The entries of one known hosts file.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct KnownHostsFile {
    /// Where the entries were read from.
    path: PathBuf,
    /// The entries in file order.
    entries: Vec<KnownHostEntry>,
}

impl KnownHostsFile {
    /// Reads and parses the known hosts file at `path`.
    ///
    /// A file that does not exist is an empty store. Lines that cannot be parsed are skipped with
    /// a warning.
    pub fn load(path: impl Into<PathBuf>) -> Result<KnownHostsFile, KnownHostsError> {
        let path = path.into();

        match fs::read(&path) {
            Ok(contents) => {
                debug!("scanning known keys from {}", path.display());

                let text = String::from_utf8_lossy(&contents);
                Ok(KnownHostsFile::parse(path, &text))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no known hosts file at {}", path.display());

                Ok(KnownHostsFile {
                    path,
                    entries: Vec::new(),
                })
            }
            Err(source) => Err(KnownHostsError::Io { path, source }),
        }
    }

    /// Parses `text` as the contents of the known hosts file at `path`.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> KnownHostsFile {
        let path = path.into();
        let entries = parse_entries(text, &path.display().to_string());

        KnownHostsFile { path, entries }
    }

    /// The path this store belongs to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The entries in file order.
    pub fn entries(&self) -> &[KnownHostEntry] {
        &self.entries
    }

    /// Appends a newly accepted key for `hostname` at `port` to the file and to this store.
    pub fn append(
        &mut self,
        hostname: &str,
        port: u16,
        key_type: &str,
        key_blob: &[u8],
        comment: Option<&str>,
    ) -> Result<(), KnownHostsError> {
        let line = format_known_host_line(hostname, port, key_type, key_blob, comment);

        let io_error = |source| KnownHostsError::Io {
            path: self.path.clone(),
            source,
        };

        let existing = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(io_error(source)),
        };
        let unterminated = existing.last().map_or(false, |&byte| byte != b'\n');
        let existing_lines =
            existing.iter().filter(|&&byte| byte == b'\n').count() + usize::from(unterminated);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;
        if unterminated {
            writeln!(file).map_err(io_error)?;
        }
        writeln!(file, "{}", line).map_err(io_error)?;

        debug!("added {} key for {} to {}", key_type, hostname, self.path.display());

        let line_number = existing_lines + 1;
        self.entries.push(KnownHostEntry {
            marker: None,
            hostname_pattern: host_key_name(hostname, port),
            key_type: key_type.to_owned(),
            key_blob: key_blob.to_vec(),
            comment: comment.map(str::to_owned),
            line: line_number,
        });

        Ok(())
    }
}

/// Parses the contents of a known hosts file.
///
/// Blank lines and lines starting with `#` are ignored. Malformed lines are skipped with a
/// warning.
pub fn parse_known_hosts(text: &str) -> Vec<KnownHostEntry> {
    parse_entries(text, "known hosts")
}

/// Parses all lines of `text`, naming `source` in warnings.
fn parse_entries(text: &str, source: &str) -> Vec<KnownHostEntry> {
    let mut entries = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_line(trimmed, line_number) {
            Ok(entry) => {
                trace!("found a public key for `{}`", entry.hostname_pattern);
                entries.push(entry);
            }
            Err(err) => warn!("{}:{}: skipping malformed line: {}", source, line_number, err),
        }
    }

    entries
}

/// Parses a single non-empty line.
fn parse_line(line: &str, line_number: usize) -> Result<KnownHostEntry, KnownHostsError> {
    let (first, rest) = split_field(line);

    let (marker, (hostname_pattern, rest)) = match first.strip_prefix('@') {
        Some("revoked") => (Some(Marker::Revoked), split_field(rest)),
        Some("cert-authority") => (Some(Marker::CertAuthority), split_field(rest)),
        Some(_) => return Err(KnownHostsError::UnknownMarker(first.to_owned())),
        None => (None, (first, rest)),
    };
    let (key_type, rest) = split_field(rest);
    let (key, comment) = split_field(rest);

    if hostname_pattern.is_empty() {
        return Err(KnownHostsError::MissingField("host pattern"));
    }
    if key_type.is_empty() {
        return Err(KnownHostsError::MissingField("key type"));
    }
    if key.is_empty() {
        return Err(KnownHostsError::MissingField("key"));
    }

    let key_blob = STANDARD.decode(key)?;

    if let Some(blob_type) = blob_key_type(&key_blob).filter(|&blob_type| blob_type != key_type) {
        warn!(
            "key for `{}` (line {}) is a `{}` key, but is declared as `{}`",
            hostname_pattern, line_number, blob_type, key_type
        );
    }

    Ok(KnownHostEntry {
        marker,
        hostname_pattern: hostname_pattern.to_owned(),
        key_type: key_type.to_owned(),
        key_blob,
        comment: Some(comment.trim_end())
            .filter(|comment| !comment.is_empty())
            .map(str::to_owned),
        line: line_number,
    })
}

/// Returns the name a host is recorded under: `hostname`, or `[hostname]:port` for ports other
/// than 22.
pub fn host_key_name(hostname: &str, port: u16) -> String {
    let hostname = hostname.to_lowercase();

    if port == DEFAULT_PORT {
        hostname
    } else {
        format!("[{}]:{}", hostname, port)
    }
}

/// Formats a known hosts line for a newly accepted key.
pub fn format_known_host_line(
    hostname: &str,
    port: u16,
    key_type: &str,
    key_blob: &[u8],
    comment: Option<&str>,
) -> String {
    let mut line = format!(
        "{} {} {}",
        host_key_name(hostname, port),
        key_type,
        STANDARD.encode(key_blob)
    );

    if let Some(comment) = comment {
        write!(line, " {}", comment).expect("writing to a string never fails");
    }

    line
}

/// Returns `true` if the comma separated `patterns` match `hostname` at `port`.
///
/// A matching negated pattern vetoes the match, regardless of its position in the list.
pub fn host_pattern_matches(patterns: &str, hostname: &str, port: u16) -> bool {
    let host = host_key_name(hostname, port);
    let mut matched = false;

    for pattern in patterns.split(',') {
        let (negated, pattern) = match pattern.strip_prefix('!') {
            Some(pattern) => (true, pattern),
            None => (false, pattern),
        };

        if !single_pattern_matches(pattern, &host) {
            continue;
        }

        if negated {
            trace!("`{}` is excluded by `!{}`", host, pattern);
            return false;
        }

        matched = true;
    }

    matched
}

/// Matches one pattern without negation against a host name as returned by [`host_key_name`].
fn single_pattern_matches(pattern: &str, host: &str) -> bool {
    if pattern.starts_with(HASHED_PREFIX) {
        hashed_host_matches(pattern, host)
    } else {
        glob_match(pattern.to_lowercase().as_bytes(), host.as_bytes())
    }
}

/// Matches `text` against a pattern where `*` matches any sequence and `?` any single byte.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    // The position of the last `*` and the text position it currently extends to.
    let mut backtrack = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == b'?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, star_t)) => {
                    backtrack = Some((star, star_t + 1));
                    p = star + 1;
                    t = star_t + 1;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

/// Checks a `|1|salt|hash` pattern against `host`.
fn hashed_host_matches(pattern: &str, host: &str) -> bool {
    let Some((salt, hash)) = pattern[HASHED_PREFIX.len()..].split_once('|') else {
        debug!("hashed host `{}` lacks a hash", pattern);
        return false;
    };
    let (Ok(salt), Ok(hash)) = (STANDARD.decode(salt), STANDARD.decode(hash)) else {
        debug!("hashed host `{}` is not valid base64", pattern);
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha1>::new_from_slice(&salt) else {
        return false;
    };
    mac.update(host.as_bytes());

    mac.finalize().into_bytes().as_slice().ct_eq(&hash).into()
}
