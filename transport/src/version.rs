//! Contains structures to deal with versioning.

use std::{borrow::Cow, fmt};

use crate::{
    constants::PROTOCOL_VERSION,
    errors::{IllegalVersionError, VersionExchangeError},
};

/// Contains version information about one participant of the connection.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct VersionInformation {
    /// The version of the protocol.
    protocol_version: Cow<'static, str>,
    /// The version of the software.
    software_version: Cow<'static, str>,
    /// The optional comment following the software version.
    comment: Option<String>,
}

impl VersionInformation {
    /// Creates new version information.
    pub fn new<V: Into<Cow<'static, str>>>(
        software_version: V,
    ) -> Result<VersionInformation, IllegalVersionError> {
        let software_version = software_version.into();

        if let Some(err) = software_version_error(&software_version) {
            Err(err)
        } else {
            Ok(VersionInformation {
                protocol_version: PROTOCOL_VERSION.into(),
                software_version,
                comment: None,
            })
        }
    }

    /// Returns the version of the protocol.
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Returns the version of the software.
    pub fn software_version(&self) -> &str {
        &self.software_version
    }

    /// Returns the comment, if the identification line had one.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Parses an identification line without its line terminator.
    ///
    /// See [RFC 4253 section 4.2](https://tools.ietf.org/html/rfc4253#section-4.2).
    pub fn parse(line: &[u8]) -> Result<VersionInformation, VersionExchangeError> {
        let line = std::str::from_utf8(line)
            .map_err(|_| VersionExchangeError::InvalidIdentification)?;
        let rest = line
            .strip_prefix("SSH-")
            .ok_or(VersionExchangeError::InvalidIdentification)?;

        let (versions, comment) = match rest.split_once(' ') {
            Some((versions, comment)) => (versions, Some(comment.to_owned())),
            None => (rest, None),
        };
        let (protocol_version, software_version) = versions
            .split_once('-')
            .ok_or(VersionExchangeError::InvalidIdentification)?;

        if protocol_version.is_empty()
            || software_version.is_empty()
            || software_version_error(protocol_version).is_some()
            || software_version_error(software_version).is_some()
        {
            return Err(VersionExchangeError::InvalidIdentification);
        }

        // "1.99" announces a server that also speaks 2.0.
        if protocol_version != PROTOCOL_VERSION && protocol_version != "1.99" {
            return Err(VersionExchangeError::UnsupportedProtocolVersion(
                protocol_version.to_owned(),
            ));
        }

        Ok(VersionInformation {
            protocol_version: protocol_version.to_owned().into(),
            software_version: software_version.to_owned().into(),
            comment,
        })
    }
}

impl Default for VersionInformation {
    fn default() -> VersionInformation {
        let software_version = format!(
            "{}_{}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            env!("CARGO_PKG_VERSION").replace('-', "_")
        );

        VersionInformation::new(software_version).expect("own software version should be legal")
    }
}

impl fmt::Display for VersionInformation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SSH-{protoversion}-{softwareversion}",
            protoversion = self.protocol_version(),
            softwareversion = self.software_version()
        )?;

        if let Some(comment) = &self.comment {
            write!(f, " {}", comment)?;
        }

        Ok(())
    }
}

/// Checks if the version is a legal software version string.
fn software_version_error(version: &str) -> Option<IllegalVersionError> {
    version.char_indices().find_map(|(index, c)| {
        if !c.is_ascii() {
            Some(IllegalVersionError::NonAscii(index))
        } else if c.is_whitespace() {
            Some(IllegalVersionError::Whitespace(index))
        } else if !c.is_ascii_graphic() {
            Some(IllegalVersionError::NonPrintable(index))
        } else if c == '-' {
            Some(IllegalVersionError::Minus(index))
        } else {
            None
        }
    })
}
