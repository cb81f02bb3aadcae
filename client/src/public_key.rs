//! Parsing of OpenSSH public key files.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use definitions::{parse, KeyError, ParsedValue};

/// The contents of a public key file: `key-type base64-blob [comment]`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublicKeyLine {
    /// The declared public key algorithm.
    pub key_type: String,
    /// The public key in SSH wire encoding.
    pub blob: Vec<u8>,
    /// The comment after the key, if any.
    pub comment: Option<String>,
}

impl PublicKeyLine {
    /// Parses the first line of a public key file.
    pub fn parse(contents: &[u8]) -> Result<PublicKeyLine, KeyError> {
        let text = std::str::from_utf8(contents)
            .map_err(|_| KeyError::InvalidKeyFormat("public key file is not UTF-8".into()))?;
        let line = text.lines().next().unwrap_or("");

        let (key_type, rest) = split_field(line);
        let (blob, comment) = split_field(rest);

        if key_type.is_empty() || blob.is_empty() {
            return Err(KeyError::InvalidKeyFormat(
                "expected `key-type base64-key [comment]`".into(),
            ));
        }

        let blob = STANDARD
            .decode(blob)
            .map_err(|err| KeyError::InvalidKeyFormat(err.to_string()))?;

        Ok(PublicKeyLine {
            key_type: key_type.to_owned(),
            blob,
            comment: Some(comment.trim_end())
                .filter(|comment| !comment.is_empty())
                .map(str::to_owned),
        })
    }
}

/// Returns the key type a public key blob declares in its first field.
pub fn blob_key_type(blob: &[u8]) -> Option<&str> {
    parse::utf8_string(blob)
        .ok()
        .map(|ParsedValue { value, .. }| value)
}

/// Splits off the first whitespace separated field of `input`.
pub(crate) fn split_field(input: &str) -> (&str, &str) {
    let input = input.trim_start();

    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], input[end..].trim_start()),
        None => (input, ""),
    }
}
