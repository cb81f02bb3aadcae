//! A blocking packet connection on top of any byte stream.

use std::{
    io::{self, Read, Write},
    sync::Arc,
};

use definitions::algorithms::MacAlgorithm;
use log::{debug, info};
use secstr::SecStr;

use crate::{
    errors::CommunicationError,
    parser::PacketDecoder,
    version::VersionInformation,
    writer::{MacWithKey, PacketEncoder},
};

/// The number of bytes requested from the stream per read.
const READ_SIZE: usize = 4096;

/// A MAC algorithm in effect for one direction, with its key.
#[derive(Debug)]
struct MacState {
    /// The algorithm computing the MACs.
    algorithm: Arc<dyn MacAlgorithm>,
    /// The integrity key of this direction.
    key: SecStr,
}

impl MacState {
    /// Borrows the state in the form the codec expects.
    fn as_mac(&self) -> MacWithKey<'_> {
        (&*self.algorithm, self.key.unsecure())
    }
}

/// Sends and receives binary packets over a blocking stream.
///
/// Each direction has its own sequence number and MAC. Until a MAC is set, packets are sent and
/// received without one.
#[derive(Debug)]
pub struct PacketStream<S> {
    /// The underlying connection.
    stream: S,
    /// Buffers outgoing packets.
    encoder: PacketEncoder,
    /// Buffers incoming data.
    decoder: PacketDecoder,
    /// The MAC for packets sent to the other party.
    outgoing_mac: Option<MacState>,
    /// The MAC for packets received from the other party.
    incoming_mac: Option<MacState>,
}

impl<S: Read + Write> PacketStream<S> {
    /// Wraps `stream`, using minimal padding for outgoing packets.
    pub fn new(stream: S) -> PacketStream<S> {
        PacketStream::with_encoder(stream, PacketEncoder::new())
    }

    /// Wraps `stream`, sending packets through `encoder`.
    ///
    /// This allows using a custom padding length distribution.
    pub fn with_encoder(stream: S, encoder: PacketEncoder) -> PacketStream<S> {
        PacketStream {
            stream,
            encoder,
            decoder: PacketDecoder::new(),
            outgoing_mac: None,
            incoming_mac: None,
        }
    }

    /// Sends the own identification line and receives the one of the other party.
    ///
    /// Returns the version information of the other party and its raw identification line,
    /// which is part of the key exchange hash.
    pub fn exchange_versions(
        &mut self,
        own_version: &VersionInformation,
    ) -> Result<(VersionInformation, Vec<u8>), CommunicationError> {
        info!("sending identification `{}`", own_version);

        self.encoder.write_version_info(own_version);
        self.flush_output()?;

        loop {
            if let Some(result) = self.decoder.parse_initialization()? {
                return Ok(result);
            }

            self.fill()?;
        }
    }

    /// Sends one packet carrying `payload` and returns its sequence number.
    pub fn send_payload(&mut self, payload: &[u8]) -> Result<u32, CommunicationError> {
        let sequence_number = self.encoder.write_packet(
            payload,
            self.outgoing_mac.as_ref().map(MacState::as_mac),
            &mut rand::thread_rng(),
        )?;

        self.flush_output()?;

        Ok(sequence_number)
    }

    /// Receives the payload of the next packet, blocking until it has fully arrived.
    pub fn recv_payload(&mut self) -> Result<Vec<u8>, CommunicationError> {
        loop {
            let mac = self.incoming_mac.as_ref().map(MacState::as_mac);

            if let Some(payload) = self.decoder.next_packet(mac)? {
                return Ok(payload);
            }

            self.fill()?;
        }
    }

    /// Starts authenticating outgoing packets with `algorithm` and `key`.
    pub fn set_outgoing_mac(&mut self, algorithm: Arc<dyn MacAlgorithm>, key: &[u8]) {
        debug!("outgoing MAC is now {}", algorithm.name());

        self.outgoing_mac = Some(MacState {
            algorithm,
            key: SecStr::new(key.to_vec()),
        });
    }

    /// Starts verifying incoming packets with `algorithm` and `key`.
    pub fn set_incoming_mac(&mut self, algorithm: Arc<dyn MacAlgorithm>, key: &[u8]) {
        debug!("incoming MAC is now {}", algorithm.name());

        self.incoming_mac = Some(MacState {
            algorithm,
            key: SecStr::new(key.to_vec()),
        });
    }

    /// The sequence number of the next outgoing packet.
    pub fn outgoing_sequence_number(&self) -> u32 {
        self.encoder.sequence_number()
    }

    /// The sequence number of the next incoming packet.
    pub fn incoming_sequence_number(&self) -> u32 {
        self.decoder.sequence_number()
    }

    /// Returns a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Returns a mutable reference to the underlying stream.
    ///
    /// Reading from or writing to it directly corrupts the packet stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwraps the underlying stream. Buffered input is lost.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Writes all buffered output to the stream.
    fn flush_output(&mut self) -> Result<(), CommunicationError> {
        let data = self.encoder.written_data();
        let len = data.len();

        self.stream.write_all(data)?;
        self.encoder.remove_to(len);
        self.stream.flush()?;

        Ok(())
    }

    /// Reads more data from the stream into the decoder.
    fn fill(&mut self) -> Result<(), CommunicationError> {
        loop {
            match self.stream.read(self.decoder.reserve(READ_SIZE)) {
                Ok(0) => return Err(CommunicationError::EndOfInput),
                Ok(read) => {
                    self.decoder.indicate_used(read);
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}
