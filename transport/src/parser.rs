//! Handles parsing of binary packets from received data.
//!
//! This is the counter part to the writer module.

use definitions::{algorithms::MacAlgorithm, parse, ParsedValue};
use log::{debug, trace};

use crate::{
    constants::{
        MAX_PACKET_LEN, MAX_PRE_VERSION_LINES, MAX_VERSION_LINE_LEN, MIN_PACKET_LEN,
        MIN_PACKET_LEN_ALIGN, MIN_PADDING_SIZE, PACKET_LEN_SIZE, PADDING_LEN_SIZE,
    },
    errors::{PacketError, VersionExchangeError},
    version::VersionInformation,
    writer::MacWithKey,
};

/// A packet that was successfully decoded.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedPacket<'data> {
    /// The payload of the packet.
    pub(crate) payload: &'data [u8],
    /// The number of input bytes the packet and its MAC occupied.
    pub(crate) consumed: usize,
}

/// Parses the header of a packet and checks the length fields for consistency.
///
/// Returns the packet length and the padding length.
fn parse_header(input: &[u8]) -> Result<(usize, usize), PacketError> {
    let header_size = PACKET_LEN_SIZE + PADDING_LEN_SIZE;

    let truncated = PacketError::TruncatedPacket {
        needed: header_size,
        available: input.len(),
    };
    let ParsedValue {
        value: packet_len,
        rest_input,
    } = parse::uint32(input).map_err(|_| truncated.clone())?;
    let ParsedValue {
        value: padding_len, ..
    } = parse::byte(rest_input).map_err(|_| truncated)?;

    let packet_len = packet_len as usize;
    let padding_len = padding_len as usize;

    if packet_len < MIN_PACKET_LEN {
        return Err(PacketError::MalformedPacket("packet length below minimum"));
    }
    if packet_len > MAX_PACKET_LEN {
        return Err(PacketError::MalformedPacket("packet length above maximum"));
    }
    if (PACKET_LEN_SIZE + packet_len) % MIN_PACKET_LEN_ALIGN != 0 {
        return Err(PacketError::MalformedPacket("packet not aligned to block size"));
    }
    if padding_len < MIN_PADDING_SIZE {
        return Err(PacketError::MalformedPacket("padding shorter than four bytes"));
    }
    if padding_len + PADDING_LEN_SIZE > packet_len {
        return Err(PacketError::MalformedPacket("padding longer than packet"));
    }

    Ok((packet_len, padding_len))
}

/// Parses one packet from the start of `input` and verifies its MAC.
pub(crate) fn parse_packet<'data>(
    input: &'data [u8],
    mac: Option<MacWithKey>,
    sequence_number: u32,
) -> Result<ParsedPacket<'data>, PacketError> {
    let (packet_len, padding_len) = parse_header(input)?;
    let mac_len = mac.map_or(0, |(algorithm, _)| algorithm.mac_length());

    let packet_end = PACKET_LEN_SIZE + packet_len;
    let total = packet_end + mac_len;

    if input.len() < total {
        return Err(PacketError::TruncatedPacket {
            needed: total,
            available: input.len(),
        });
    }

    if let Some((algorithm, key)) = mac {
        let mut mac_input = Vec::with_capacity(4 + packet_end);
        mac_input.extend_from_slice(&sequence_number.to_be_bytes());
        mac_input.extend_from_slice(&input[..packet_end]);

        if !algorithm.check_mac(key, &mac_input, &input[packet_end..total]) {
            debug!("MAC mismatch on packet #{}", sequence_number);
            return Err(PacketError::MacMismatch);
        }
    }

    let payload_start = PACKET_LEN_SIZE + PADDING_LEN_SIZE;
    let payload_end = packet_end - padding_len;

    Ok(ParsedPacket {
        payload: &input[payload_start..payload_end],
        consumed: total,
    })
}

/// Decodes one binary packet from `bytes` and returns its payload.
///
/// Any bytes after the packet and its MAC are ignored.
///
/// See [RFC 4253 section 6](https://tools.ietf.org/html/rfc4253#section-6).
pub fn decode<'data>(
    bytes: &'data [u8],
    mac_algorithm: &dyn MacAlgorithm,
    mac_key: &[u8],
    sequence_number: u32,
) -> Result<&'data [u8], PacketError> {
    parse_packet(bytes, Some((mac_algorithm, mac_key)), sequence_number)
        .map(|packet| packet.payload)
}

/// Collects received data and yields complete packets from it.
///
/// Data may arrive in arbitrarily sized pieces; incomplete packets stay buffered until the rest
/// arrives. Keeps track of the incoming sequence number.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PacketDecoder {
    /// The data that has been received so far.
    data: Vec<u8>,
    /// The index of the first byte that has not yet been parsed.
    parsed_until: usize,
    /// The index of the first byte that has not yet been initialized.
    initialized_until: usize,
    /// The sequence number of the next packet.
    sequence_number: u32,
    /// The number of lines skipped while waiting for the identification line.
    skipped_lines: usize,
}

impl PacketDecoder {
    /// Creates a new empty decoder.
    pub fn new() -> PacketDecoder {
        PacketDecoder::default()
    }

    /// The sequence number the next packet will be verified with.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Returns `true` if received data is waiting to be parsed.
    pub fn has_buffered_data(&self) -> bool {
        self.initialized_until > self.parsed_until
    }

    /// Reserves `size` bytes for input and returns access to them.
    ///
    /// After reading into the returned slice, the number of bytes read must be announced with
    /// [`indicate_used`](PacketDecoder::indicate_used).
    pub fn reserve(&mut self, size: usize) -> &mut [u8] {
        self.remove_old_data();

        let additional_capacity = self.data.len() - self.initialized_until;
        let space_needed = size.saturating_sub(additional_capacity);

        self.data.resize(self.data.len() + space_needed, 0);

        &mut self.data[self.initialized_until..self.initialized_until + size]
    }

    /// Indicates that `size` additional bytes are now in use.
    pub fn indicate_used(&mut self, size: usize) {
        self.initialized_until += size;

        debug_assert!(self.initialized_until <= self.data.len());
    }

    /// Appends received bytes.
    pub fn extend(&mut self, input: &[u8]) {
        self.reserve(input.len()).copy_from_slice(input);
        self.indicate_used(input.len());
    }

    /// Returns the payload of the next complete packet, or `None` if more data is needed.
    ///
    /// `mac` is `None` while no MAC algorithm is in effect. A failed packet is not consumed, so
    /// the decoder should be discarded after an error.
    pub fn next_packet(&mut self, mac: Option<MacWithKey>) -> Result<Option<Vec<u8>>, PacketError> {
        let input = &self.data[self.parsed_until..self.initialized_until];

        match parse_packet(input, mac, self.sequence_number) {
            Ok(packet) => {
                trace!(
                    "decoded packet #{}: {} payload bytes",
                    self.sequence_number,
                    packet.payload.len()
                );

                let payload = packet.payload.to_vec();
                let consumed = packet.consumed;

                self.parsed_until += consumed;
                self.sequence_number = self.sequence_number.wrapping_add(1);

                Ok(Some(payload))
            }
            Err(PacketError::TruncatedPacket { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Parses the identification line of the other party.
    ///
    /// Lines before the identification line are skipped. Returns `None` if more data is needed.
    /// On success the version information and the raw identification line (without CR LF) are
    /// returned; everything after it is left for [`next_packet`](PacketDecoder::next_packet).
    ///
    /// See [RFC 4253 section 4.2](https://tools.ietf.org/html/rfc4253#section-4.2).
    pub fn parse_initialization(
        &mut self,
    ) -> Result<Option<(VersionInformation, Vec<u8>)>, VersionExchangeError> {
        loop {
            let input = &self.data[self.parsed_until..self.initialized_until];

            let line_end = match input.iter().position(|&b| b == b'\n') {
                Some(index) => index,
                None if input.len() >= MAX_VERSION_LINE_LEN => {
                    return Err(VersionExchangeError::TooLong)
                }
                None => return Ok(None),
            };

            if line_end >= MAX_VERSION_LINE_LEN {
                return Err(VersionExchangeError::TooLong);
            }

            // Tolerate a missing carriage return, as some old servers do.
            let line = match input[..line_end].strip_suffix(b"\r") {
                Some(line) => line,
                None => &input[..line_end],
            };
            let line = line.to_vec();

            self.parsed_until += line_end + 1;

            if line.starts_with(b"SSH-") {
                let info = VersionInformation::parse(&line)?;
                debug!("received identification `{}`", info);

                return Ok(Some((info, line)));
            }

            self.skipped_lines += 1;
            trace!("skipped pre-identification line #{}", self.skipped_lines);

            if self.skipped_lines > MAX_PRE_VERSION_LINES {
                return Err(VersionExchangeError::TooLong);
            }
        }
    }

    /// Shrinks the buffer by dropping data that was already parsed.
    fn remove_old_data(&mut self) {
        self.data.drain(..self.parsed_until);

        self.initialized_until -= self.parsed_until;
        self.parsed_until = 0;
    }
}
