//! Defines constants of the SSH binary packet protocol and version exchange.

use std::mem::size_of;

use static_assertions::const_assert;

/// The size, in bytes, of the packet length field of a packet.
pub(crate) const PACKET_LEN_SIZE: usize = size_of::<u32>();

/// The size, in bytes, of the padding length field of a packet.
pub(crate) const PADDING_LEN_SIZE: usize = size_of::<u8>();

/// The minimum padding size of a packet.
pub(crate) const MIN_PADDING_SIZE: usize = 4;

/// The maximum padding size of a packet.
pub(crate) const MAX_PADDING_SIZE: usize = 0xff;

/// The block size packets are aligned to while no cipher is in effect.
pub(crate) const MIN_PACKET_LEN_ALIGN: usize = 8;

/// The smallest legal value of the `packet_length` field.
pub(crate) const MIN_PACKET_LEN: usize = 12;

/// The smallest legal size of a whole packet, including the length field and excluding the MAC.
pub(crate) const MIN_PACKET_SIZE: usize = 16;

/// The largest `packet_length` that is accepted from the other party.
pub const MAX_PACKET_LEN: usize = 256 * 1024;

/// The maximum number of extra padding blocks.
///
/// This should be used when creating a custom distribution function for
/// padding lengths.
pub const MAX_EXTRA_PADDING_BLOCKS: usize = MAX_PADDING_SIZE / MIN_PACKET_LEN_ALIGN;

/// The protocol version supported by this library.
pub const PROTOCOL_VERSION: &str = "2.0";

/// The longest identification line accepted during the version exchange, including CR LF.
pub(crate) const MAX_VERSION_LINE_LEN: usize = 255;

/// The most lines the server may send before its identification line.
pub(crate) const MAX_PRE_VERSION_LINES: usize = 1024;

const_assert!(MIN_PACKET_SIZE == PACKET_LEN_SIZE + MIN_PACKET_LEN);
const_assert!(MIN_PACKET_SIZE % MIN_PACKET_LEN_ALIGN == 0);
