//! Provides helpers for writing tests.
//!
//! Most notable is the `FakeNetwork` type.

use std::{
    cmp::min,
    io::{self, Read, Write},
};

/// Acts as a fake network connection for the SSH transport layer.
///
/// Reads deliver at most `packet_size` bytes at a time, to exercise partial reads.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FakeNetwork {
    /// The data still to be received.
    input_data: Vec<u8>,
    /// The maximum amount of data that should be received in one read.
    packet_size: usize,
    /// The data that was sent.
    written_data: Vec<u8>,
    /// The index of the first byte that was not flushed.
    flushed_to: usize,
}

impl FakeNetwork {
    /// Creates a fake network from the given input data and the packet size.
    pub(crate) fn new(input_data: Vec<u8>, packet_size: usize) -> FakeNetwork {
        FakeNetwork {
            input_data,
            packet_size,
            written_data: Vec::new(),
            flushed_to: 0,
        }
    }

    /// Returns a reference to the data that was written and flushed.
    pub(crate) fn written(&self) -> &[u8] {
        &self.written_data[..self.flushed_to]
    }
}

impl Read for FakeNetwork {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let amount_to_copy = min(min(self.input_data.len(), self.packet_size), buf.len());

        buf[..amount_to_copy].copy_from_slice(&self.input_data[..amount_to_copy]);
        self.input_data.drain(..amount_to_copy);

        Ok(amount_to_copy)
    }
}

impl Write for FakeNetwork {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written_data.extend_from_slice(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushed_to = self.written_data.len();

        Ok(())
    }
}
