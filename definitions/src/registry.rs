//! A name-keyed collection of algorithm implementations.

use std::fmt;

use crate::errors::{InvalidNameError, RegistryError};

/// A trait to abstract over algorithms being named.
///
/// The name of a value must not change while it is stored in a [`Registry`].
pub trait Nameable {
    /// Returns the name of `self`.
    fn name(&self) -> &str;
}

/// Maps algorithm names to their implementations.
///
/// Entries keep the order in which they were registered, which is the order used when the names
/// are advertised to the other party. Registering a name twice is rejected.
pub struct Registry<Entry: Nameable> {
    entries: Vec<Entry>,
}

impl<Entry: Nameable> Registry<Entry> {
    /// Creates an empty registry.
    pub fn new() -> Registry<Entry> {
        Registry {
            entries: Vec::new(),
        }
    }

    /// Adds `entry` to the end of the registry.
    pub fn register(&mut self, entry: Entry) -> Result<&mut Self, RegistryError> {
        validate_algorithm_name(entry.name()).map_err(|reason| RegistryError::InvalidName {
            name: entry.name().to_owned(),
            reason,
        })?;

        if self.contains(entry.name()) {
            return Err(RegistryError::DuplicateAlgorithm(entry.name().to_owned()));
        }

        self.entries.push(entry);

        Ok(self)
    }

    /// Returns the entry registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<&Entry, RegistryError> {
        self.entries
            .iter()
            .find(|entry| entry.name() == name)
            .ok_or_else(|| RegistryError::UnknownAlgorithm(name.to_owned()))
    }

    /// Returns `true` if an entry named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name() == name)
    }

    /// The names of all entries in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Nameable::name).collect()
    }

    /// Iterates over all entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// The number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<Entry: Nameable> Default for Registry<Entry> {
    fn default() -> Self {
        Registry::new()
    }
}

impl<Entry: Nameable> fmt::Debug for Registry<Entry> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

/// Checks if the given domain name is valid.
fn is_valid_domain(domain: &str) -> bool {
    domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Checks that `name` is a valid algorithm name according to
/// [RFC 4251](https://tools.ietf.org/html/rfc4251#section-6).
pub fn validate_algorithm_name(name: &str) -> Result<(), InvalidNameError> {
    if name.is_empty() {
        return Err(InvalidNameError::EmptyName);
    }
    if name.len() > 64 {
        return Err(InvalidNameError::TooLong);
    }

    for c in name.chars() {
        if c == ',' {
            return Err(InvalidNameError::CommaUsed);
        } else if !c.is_ascii() {
            return Err(InvalidNameError::NonAscii(c));
        } else if c.is_ascii_whitespace() {
            return Err(InvalidNameError::Whitespace(c));
        } else if !c.is_ascii_graphic() {
            return Err(InvalidNameError::NonPrintable(c));
        }
    }

    let mut parts = name.split('@').skip(1);

    if let Some(domain) = parts.next() {
        if !is_valid_domain(domain) {
            return Err(InvalidNameError::InvalidDomain);
        }
    }

    match parts.next() {
        None => Ok(()),
        Some(_) => Err(InvalidNameError::TooManyAtSymbols),
    }
}
