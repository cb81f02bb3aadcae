//! Handles aggregating of payloads into binary packets.
//!
//! This is the counter part to the parser module.

use std::{cmp::min, fmt};

use definitions::{algorithms::MacAlgorithm, write, CryptoRngCore};
use log::trace;

use crate::{
    constants::{
        MAX_PACKET_LEN, MAX_PADDING_SIZE, MIN_PACKET_LEN_ALIGN, MIN_PADDING_SIZE,
        PACKET_LEN_SIZE, PADDING_LEN_SIZE,
    },
    errors::PacketError,
    padding_length::{minimal_distribution, PaddingLengthDistribution},
    version::VersionInformation,
};

/// A MAC algorithm together with the key it authenticates with.
pub type MacWithKey<'a> = (&'a dyn MacAlgorithm, &'a [u8]);

/// Computes the padding length for a payload of `payload_len` bytes.
///
/// The result is the smallest padding of at least four bytes that aligns the whole packet
/// (including the length field) to `align`, plus `extra_blocks` blocks as long as the padding
/// still fits into a byte.
pub(crate) fn padding_length(payload_len: usize, align: usize, extra_blocks: u8) -> u8 {
    let offset_to_next_alignment = align - ((payload_len + PACKET_LEN_SIZE + PADDING_LEN_SIZE) % align);

    let min_padding_len = if offset_to_next_alignment >= MIN_PADDING_SIZE {
        offset_to_next_alignment
    } else {
        offset_to_next_alignment + align
    };
    let max_extra_blocks = (MAX_PADDING_SIZE - min_padding_len) / align;

    let padding_len = min_padding_len + min(extra_blocks as usize, max_extra_blocks) * align;

    u8::try_from(padding_len).expect("padding len fits into u8")
}

/// Appends one binary packet carrying `payload` to `output`.
///
/// The MAC input is the sequence number followed by the whole unencrypted packet. Extra padding
/// blocks are left out if they would push the packet beyond [`MAX_PACKET_LEN`].
fn write_packet_to(
    output: &mut Vec<u8>,
    payload: &[u8],
    mac: Option<MacWithKey>,
    sequence_number: u32,
    rng: &mut dyn CryptoRngCore,
    extra_blocks: u8,
) -> Result<(), PacketError> {
    let mut padding_len = padding_length(payload.len(), MIN_PACKET_LEN_ALIGN, extra_blocks);
    if PADDING_LEN_SIZE + payload.len() + padding_len as usize > MAX_PACKET_LEN {
        padding_len = padding_length(payload.len(), MIN_PACKET_LEN_ALIGN, 0);
    }

    let packet_len = PADDING_LEN_SIZE + payload.len() + padding_len as usize;
    if packet_len > MAX_PACKET_LEN {
        return Err(PacketError::PayloadTooLarge {
            payload_len: payload.len(),
        });
    }
    let packet_len = packet_len as u32;
    let mac_len = mac.map_or(0, |(algorithm, _)| algorithm.mac_length());

    let packet_start = output.len();
    output.reserve(PACKET_LEN_SIZE + packet_len as usize + mac_len);

    // Header
    write::uint32(packet_len, output).expect("vec write cannot error");
    write::byte(padding_len, output).expect("vec write cannot error");

    output.extend_from_slice(payload);

    // Random padding
    let padding_start = output.len();
    output.resize(padding_start + padding_len as usize, 0);
    rng.fill_bytes(&mut output[padding_start..]);

    if let Some((algorithm, key)) = mac {
        let mut mac_input = Vec::with_capacity(4 + output.len() - packet_start);
        write::uint32(sequence_number, &mut mac_input).expect("vec write cannot error");
        mac_input.extend_from_slice(&output[packet_start..]);

        let mac = algorithm.compute_mac(key, &mac_input);
        debug_assert_eq!(mac.len(), algorithm.mac_length());

        output.extend_from_slice(&mac);
    }

    trace!(
        "encoded packet #{}: {} payload bytes, {} padding bytes, {} MAC bytes",
        sequence_number,
        payload.len(),
        padding_len,
        mac_len
    );

    Ok(())
}

/// Encodes `payload` as a binary packet with minimal random padding.
///
/// The padding bytes are drawn from the thread local random number generator.
///
/// Fails with [`PacketError::PayloadTooLarge`] if the packet would exceed [`MAX_PACKET_LEN`].
///
/// See [RFC 4253 section 6](https://tools.ietf.org/html/rfc4253#section-6).
pub fn encode(
    payload: &[u8],
    mac_algorithm: &dyn MacAlgorithm,
    mac_key: &[u8],
    sequence_number: u32,
) -> Result<Vec<u8>, PacketError> {
    encode_with_rng(
        payload,
        mac_algorithm,
        mac_key,
        sequence_number,
        &mut rand::thread_rng(),
    )
}

/// Encodes `payload` as a binary packet, drawing the padding bytes from `rng`.
pub fn encode_with_rng(
    payload: &[u8],
    mac_algorithm: &dyn MacAlgorithm,
    mac_key: &[u8],
    sequence_number: u32,
    rng: &mut dyn CryptoRngCore,
) -> Result<Vec<u8>, PacketError> {
    let mut output = Vec::new();

    write_packet_to(
        &mut output,
        payload,
        Some((mac_algorithm, mac_key)),
        sequence_number,
        rng,
        0,
    )?;

    Ok(output)
}

/// Encodes `payload` as a binary packet without a MAC.
pub(crate) fn encode_without_mac(
    payload: &[u8],
    sequence_number: u32,
    rng: &mut dyn CryptoRngCore,
) -> Result<Vec<u8>, PacketError> {
    let mut output = Vec::new();

    write_packet_to(&mut output, payload, None, sequence_number, rng, 0)?;

    Ok(output)
}

/// Buffers outgoing data until it is written to the network.
///
/// Keeps track of the outgoing sequence number.
pub struct PacketEncoder {
    /// The data that was not yet written to the network.
    data: Vec<u8>,
    /// The sequence number of the next packet.
    sequence_number: u32,
    /// Chooses the number of extra padding blocks per packet.
    padding_distribution: Box<PaddingLengthDistribution>,
}

impl fmt::Debug for PacketEncoder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PacketEncoder")
            .field("data", &self.data)
            .field("sequence_number", &self.sequence_number)
            .finish_non_exhaustive()
    }
}

impl Default for PacketEncoder {
    fn default() -> Self {
        PacketEncoder::new()
    }
}

impl PacketEncoder {
    /// Creates an encoder that uses minimal padding.
    pub fn new() -> PacketEncoder {
        PacketEncoder::with_padding_distribution(minimal_distribution())
    }

    /// Creates an encoder that adds extra padding blocks chosen by `distribution`.
    pub fn with_padding_distribution(
        distribution: Box<PaddingLengthDistribution>,
    ) -> PacketEncoder {
        PacketEncoder {
            data: Vec::new(),
            sequence_number: 0,
            padding_distribution: distribution,
        }
    }

    /// The sequence number the next packet will use.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Writes a packet with the given payload and returns its sequence number.
    ///
    /// `mac` is `None` while no MAC algorithm is in effect. A payload that does not fit into a
    /// packet is rejected without consuming a sequence number.
    pub fn write_packet(
        &mut self,
        payload: &[u8],
        mac: Option<MacWithKey>,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<u32, PacketError> {
        let sequence_number = self.sequence_number;
        let extra_blocks = (self.padding_distribution)(rng);

        write_packet_to(
            &mut self.data,
            payload,
            mac,
            sequence_number,
            rng,
            extra_blocks,
        )?;

        self.sequence_number = self.sequence_number.wrapping_add(1);

        Ok(sequence_number)
    }

    /// Writes the identification line for the version exchange.
    pub fn write_version_info(&mut self, version_info: &VersionInformation) {
        self.data
            .extend_from_slice(format!("{}\r\n", version_info).as_bytes());
    }

    /// Returns all the non-removed data that has been written so far.
    ///
    /// After this data was sent over the network, the amount sent should be removed with
    /// [`remove_to`](PacketEncoder::remove_to).
    pub fn written_data(&self) -> &[u8] {
        &self.data
    }

    /// Removes data up to the given index.
    pub fn remove_to(&mut self, index: usize) {
        self.data.drain(..index);
    }
}

#[cfg(test)]
mod tests {
    use algorithms::mac;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::{constants::MIN_PACKET_SIZE, padding_length::randomized_distribution};

    #[test]
    fn minimal_padding_lengths() {
        for payload_len in 0..1000usize {
            let padding_len = padding_length(payload_len, 8, 0) as usize;
            let total = PACKET_LEN_SIZE + PADDING_LEN_SIZE + payload_len + padding_len;

            assert_eq!(total % 8, 0, "payload_len {}", payload_len);
            assert!(total >= MIN_PACKET_SIZE);
            assert!((MIN_PADDING_SIZE..MIN_PADDING_SIZE + 8).contains(&padding_len));
        }
    }

    #[test]
    fn extra_padding_is_capped() {
        for payload_len in 0..64usize {
            for extra_blocks in [0, 1, 5, 31, 32, 200, 255] {
                let padding_len = padding_length(payload_len, 8, extra_blocks) as usize;

                assert_eq!(
                    (PACKET_LEN_SIZE + PADDING_LEN_SIZE + payload_len + padding_len) % 8,
                    0
                );
                assert!(padding_len >= MIN_PADDING_SIZE);
            }
        }
    }

    #[test]
    fn known_padding_lengths() {
        // 4 + 1 + 5 = 10, so 6 more bytes reach 16.
        assert_eq!(padding_length(5, 8, 0), 6);
        // 4 + 1 + 0 = 5, 3 bytes would align but are too few.
        assert_eq!(padding_length(0, 8, 0), 11);
        assert_eq!(padding_length(3, 8, 0), 8);
        assert_eq!(padding_length(3, 8, 1), 16);
    }

    #[test]
    fn encoder_tracks_sequence_numbers() {
        let mut rng = ChaCha20Rng::from_seed(Default::default());
        let mut encoder = PacketEncoder::new();

        assert_eq!(encoder.write_packet(b"first", None, &mut rng), Ok(0));
        assert_eq!(encoder.write_packet(b"second", None, &mut rng), Ok(1));
        assert_eq!(encoder.sequence_number(), 2);

        // 4 + 1 + 5 + 6 and 4 + 1 + 6 + 5
        assert_eq!(encoder.written_data().len(), 32);
        assert_eq!(&encoder.written_data()[..10], b"\x00\x00\x00\x0c\x06first");
        assert_eq!(&encoder.written_data()[16..27], b"\x00\x00\x00\x0c\x05second");

        encoder.remove_to(16);
        assert_eq!(encoder.written_data().len(), 16);

        encoder.remove_to(16);
        assert_eq!(encoder.written_data(), b"");
    }

    #[test]
    fn encoder_appends_mac() {
        let mut rng = ChaCha20Rng::from_seed(Default::default());
        let mut encoder = PacketEncoder::with_padding_distribution(randomized_distribution());
        let key = [0x42; 32];

        let hmac: &dyn MacAlgorithm = &mac::HmacSha2256;
        encoder
            .write_packet(b"hello", Some((hmac, &key[..])), &mut rng)
            .unwrap();

        let data = encoder.written_data();
        let packet_len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;

        assert_eq!(data.len(), 4 + packet_len + 32);
        assert_eq!((4 + packet_len) % 8, 0);

        let mut mac_input = vec![0, 0, 0, 0];
        mac_input.extend_from_slice(&data[..4 + packet_len]);
        assert!(mac::HmacSha2256.check_mac(&key, &mac_input, &data[4 + packet_len..]));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut rng = ChaCha20Rng::from_seed(Default::default());
        let mut encoder = PacketEncoder::with_padding_distribution(randomized_distribution());

        // 4 + 1 + largest + 4 bytes of padding is the largest aligned packet within the limit.
        let largest = MAX_PACKET_LEN - PADDING_LEN_SIZE - 2 * MIN_PADDING_SIZE;
        assert_eq!(padding_length(largest, 8, 0) as usize, MIN_PADDING_SIZE);

        for _ in 0..8 {
            encoder.write_packet(&vec![0; largest], None, &mut rng).unwrap();
        }
        let data = encoder.written_data();
        assert_eq!(data.len(), 8 * MAX_PACKET_LEN);
        assert_eq!(
            u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize,
            MAX_PACKET_LEN - PACKET_LEN_SIZE
        );

        assert_eq!(
            encoder.write_packet(&vec![0; largest + 1], None, &mut rng),
            Err(PacketError::PayloadTooLarge {
                payload_len: largest + 1
            })
        );
        assert_eq!(encoder.sequence_number(), 8);
        assert_eq!(
            encode(&vec![0x41; 300 * 1024], &mac::None, b"", 0),
            Err(PacketError::PayloadTooLarge {
                payload_len: 300 * 1024
            })
        );
    }

    #[test]
    fn version_line() {
        let mut encoder = PacketEncoder::new();

        encoder.write_version_info(&VersionInformation::new("minissh_0.1").unwrap());

        assert_eq!(encoder.written_data(), b"SSH-2.0-minissh_0.1\r\n");
    }
}
