//! Parser functions for SSH primitives.

// All the primitive parsers in this module are `#[inline]`, because they are small and are
// chained frequently in message parsers.

/// Holds the result of a successful parse.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ParsedValue<'data, T> {
    /// The value that was parsed.
    pub value: T,
    /// The rest of the input that was not consumed during the parse.
    pub rest_input: &'data [u8],
}

/// Communicates the reason why parsing was not successful.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, thiserror::Error)]
pub enum ParseError {
    /// Not enough data was available to complete the parse.
    #[error("not enough data available to complete the parse")]
    Incomplete,
    /// The input cannot be validly parsed into the expected structure.
    #[error("the parser input did not contain a valid value")]
    Invalid,
}

/// The result type of a parsing operation.
pub type Result<'data, T> = std::result::Result<ParsedValue<'data, T>, ParseError>;

/// Parses `N` bytes from the input into an array.
///
/// See [RFC 4251 page 8](https://tools.ietf.org/html/rfc4251#page-8).
#[inline]
pub fn bytes_const<const N: usize>(input: &[u8]) -> Result<'_, [u8; N]> {
    bytes(input, N).map(|ParsedValue { value, rest_input }| {
        let mut array = [0; N];
        array.copy_from_slice(value);

        ParsedValue {
            value: array,
            rest_input,
        }
    })
}

/// Parses `n` bytes from the input.
///
/// See [RFC 4251 page 8](https://tools.ietf.org/html/rfc4251#page-8).
#[inline]
pub fn bytes(input: &[u8], n: usize) -> Result<'_, &[u8]> {
    if input.len() < n {
        Err(ParseError::Incomplete)
    } else {
        Ok(ParsedValue {
            value: &input[..n],
            rest_input: &input[n..],
        })
    }
}

/// Parses a single byte from the input.
#[inline]
pub fn byte(input: &[u8]) -> Result<'_, u8> {
    match input.split_first() {
        Some((&value, rest_input)) => Ok(ParsedValue { value, rest_input }),
        None => Err(ParseError::Incomplete),
    }
}

/// Parses a boolean from the input.
///
/// All non-zero values are interpreted as `true`.
///
/// See [RFC 4251 page 9](https://tools.ietf.org/html/rfc4251#page-9).
#[inline]
pub fn boolean(input: &[u8]) -> Result<'_, bool> {
    byte(input).map(|ParsedValue { value, rest_input }| ParsedValue {
        value: value != 0,
        rest_input,
    })
}

/// Parses a uint32 in network byte order from the input.
///
/// See [RFC 4251 page 9](https://tools.ietf.org/html/rfc4251#page-9).
#[inline]
pub fn uint32(input: &[u8]) -> Result<'_, u32> {
    bytes_const::<4>(input).map(|ParsedValue { value, rest_input }| ParsedValue {
        value: u32::from_be_bytes(value),
        rest_input,
    })
}

/// Parses a string from the input.
///
/// A string is a uint32 length followed by that many arbitrary bytes.
///
/// See [RFC 4251 page 9](https://tools.ietf.org/html/rfc4251#page-9).
#[inline]
pub fn string(input: &[u8]) -> Result<'_, &[u8]> {
    let ParsedValue {
        value: len,
        rest_input,
    } = uint32(input)?;

    bytes(rest_input, len as usize)
}

/// Parses a string from the input and checks that it is valid UTF-8.
#[inline]
pub fn utf8_string(input: &[u8]) -> Result<'_, &str> {
    let ParsedValue { value, rest_input } = string(input)?;

    std::str::from_utf8(value)
        .map(|value| ParsedValue { value, rest_input })
        .map_err(|_| ParseError::Invalid)
}

/// Parses a name-list from the input.
///
/// A name-list is a string containing a comma-separated list of non-empty US-ASCII names.
///
/// See [RFC 4251 page 10](https://tools.ietf.org/html/rfc4251#page-10).
#[inline]
pub fn name_list<'input, T>(input: &'input [u8]) -> Result<'input, Vec<T>>
where
    &'input str: Into<T>,
{
    let ParsedValue {
        value: string,
        rest_input,
    } = string(input)?;

    if string.is_empty() {
        return Ok(ParsedValue {
            value: vec![],
            rest_input,
        });
    }

    if !string.is_ascii() {
        return Err(ParseError::Invalid);
    }

    let string = std::str::from_utf8(string).map_err(|_| ParseError::Invalid)?;

    if string.split(',').any(str::is_empty) {
        return Err(ParseError::Invalid);
    }

    Ok(ParsedValue {
        value: string.split(',').map(Into::into).collect(),
        rest_input,
    })
}
