//! Writer functions for SSH primitives and a `Compose` trait to abstract over writable types.

use std::io::{self, Write};

/// Allows implementors to be written to an output [`std::io::Write`].
pub trait Compose {
    /// Writes `self` to `output`.
    fn compose(&self, output: &mut impl Write) -> io::Result<()>;

    /// Writes `self` to a new `Vec`.
    fn compose_to_vec(&self) -> Vec<u8> {
        let mut vec = Vec::new();

        self.compose(&mut vec)
            .expect("writing to a vec never fails");

        vec
    }
}

/// Writes the raw bytes of `input` to the output, without a length prefix.
///
/// See [RFC 4251 page 8](https://tools.ietf.org/html/rfc4251#page-8).
#[inline]
pub fn bytes(input: &[u8], output: &mut impl Write) -> io::Result<()> {
    output.write_all(input)
}

/// Writes a single byte to the output.
#[inline]
pub fn byte(input: u8, output: &mut impl Write) -> io::Result<()> {
    output.write_all(&[input])
}

/// Writes a boolean to the output as `0` or `1`.
///
/// See [RFC 4251 page 9](https://tools.ietf.org/html/rfc4251#page-9).
#[inline]
pub fn boolean(input: bool, output: &mut impl Write) -> io::Result<()> {
    byte(u8::from(input), output)
}

/// Writes a uint32 in network byte order to the output.
///
/// See [RFC 4251 page 9](https://tools.ietf.org/html/rfc4251#page-9).
#[inline]
pub fn uint32(input: u32, output: &mut impl Write) -> io::Result<()> {
    output.write_all(&input.to_be_bytes())
}

/// Writes a length-prefixed string to the output.
///
/// See [RFC 4251 page 9](https://tools.ietf.org/html/rfc4251#page-9).
///
/// # Panics
///
/// Panics for inputs longer than `u32::MAX` bytes, which an SSH string cannot represent.
#[inline]
pub fn string(input: &[u8], output: &mut impl Write) -> io::Result<()> {
    let len = u32::try_from(input.len()).expect("input fits into an ssh string");

    uint32(len, output)?;
    bytes(input, output)
}

/// Writes a name-list to the output.
///
/// The names must be non-empty US-ASCII without commas. This is only checked in debug builds.
///
/// See [RFC 4251 page 10](https://tools.ietf.org/html/rfc4251#page-10).
#[inline]
pub fn name_list<T: AsRef<str>>(input: &[T], output: &mut impl Write) -> io::Result<()> {
    debug_assert!(
        input
            .iter()
            .map(AsRef::as_ref)
            .all(|name| !name.is_empty() && name.is_ascii() && !name.contains(',')),
        "name-list entries must be non-empty ascii without commas"
    );

    let joined = input
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(",");

    string(joined.as_bytes(), output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_append() {
        let mut vec = b"data".to_vec();

        byte(0x32, &mut vec).unwrap();
        boolean(true, &mut vec).unwrap();
        boolean(false, &mut vec).unwrap();
        uint32(0x29b7f4aa, &mut vec).unwrap();

        assert_eq!(&vec[..], &b"data\x32\x01\x00\x29\xb7\xf4\xaa"[..]);
    }

    #[test]
    fn test_string() {
        let mut vec = Vec::new();

        string(b"testing", &mut vec).unwrap();
        string(b"", &mut vec).unwrap();
        string(&[0x00, 0xff], &mut vec).unwrap();

        assert_eq!(
            &vec[..],
            &b"\x00\x00\x00\x07testing\x00\x00\x00\x00\x00\x00\x00\x02\x00\xff"[..]
        );
    }

    #[test]
    fn test_name_list() {
        let mut vec = Vec::new();

        let empty: &[&str] = &[];
        name_list(empty, &mut vec).unwrap();
        name_list(&["hmac-sha2-256", "none"], &mut vec).unwrap();

        assert_eq!(
            &vec[..],
            &b"\x00\x00\x00\x00\x00\x00\x00\x12hmac-sha2-256,none"[..]
        );
    }

    #[test]
    fn test_compose_to_vec() {
        struct Pair(u32, &'static [u8]);

        impl Compose for Pair {
            fn compose(&self, output: &mut impl Write) -> io::Result<()> {
                uint32(self.0, output)?;
                string(self.1, output)
            }
        }

        assert_eq!(
            Pair(1, b"ab").compose_to_vec(),
            b"\x00\x00\x00\x01\x00\x00\x00\x02ab".to_vec()
        );
    }
}
