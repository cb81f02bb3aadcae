//! The `SSH_MSG_KEXINIT` algorithm negotiation message.
//!
//! See [RFC 4253 section 7.1](https://tools.ietf.org/html/rfc4253#section-7.1).

use std::io::{self, Write};

use definitions::{
    consts::message_numbers::SSH_MSG_KEXINIT, parse, write, Compose, CryptoRngCore, ParsedValue,
};

use crate::{
    errors::{KexInitError, PacketError},
    writer,
};

/// The names of the ten algorithm fields, in wire order.
pub const FIELD_NAMES: [&str; 10] = [
    "kex_algorithms",
    "server_host_key_algorithms",
    "encryption_algorithms_client_to_server",
    "encryption_algorithms_server_to_client",
    "mac_algorithms_client_to_server",
    "mac_algorithms_server_to_client",
    "compression_algorithms_client_to_server",
    "compression_algorithms_server_to_client",
    "languages_client_to_server",
    "languages_server_to_client",
];

/// The algorithm lists a client proposes, used for both directions.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct AlgorithmLists<'a> {
    /// Key exchange algorithms.
    pub kex: &'a [&'a str],
    /// Server host key algorithms.
    pub server_host_key: &'a [&'a str],
    /// Encryption algorithms.
    pub encryption: &'a [&'a str],
    /// MAC algorithms.
    pub mac: &'a [&'a str],
    /// Compression algorithms.
    pub compression: &'a [&'a str],
}

/// An `SSH_MSG_KEXINIT` message.
///
/// The algorithm fields are kept as the opaque bytes of their name-lists; use [`name_list`] to
/// split one into names.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct KexInit {
    /// Random bytes chosen by the sender.
    pub cookie: [u8; 16],
    /// The ten algorithm fields in wire order, see [`FIELD_NAMES`].
    pub fields: [Vec<u8>; 10],
    /// Whether a guessed key exchange packet follows.
    pub first_kex_packet_follows: bool,
    /// Reserved for future extension, sent as `0`.
    pub reserved: u32,
}

/// Splits a name-list field into its names.
///
/// An empty field has no names.
pub fn name_list(field: &[u8]) -> Vec<&str> {
    match std::str::from_utf8(field) {
        Ok("") | Err(_) => Vec::new(),
        Ok(list) => list.split(',').filter(|name| !name.is_empty()).collect(),
    }
}

impl KexInit {
    /// Creates a message proposing `lists` in both directions, with a cookie drawn from `rng`.
    pub fn new(rng: &mut dyn CryptoRngCore, lists: &AlgorithmLists) -> KexInit {
        let mut cookie = [0; 16];
        rng.fill_bytes(&mut cookie);

        let join = |names: &[&str]| names.join(",").into_bytes();

        KexInit {
            cookie,
            fields: [
                join(lists.kex),
                join(lists.server_host_key),
                join(lists.encryption),
                join(lists.encryption),
                join(lists.mac),
                join(lists.mac),
                join(lists.compression),
                join(lists.compression),
                Vec::new(),
                Vec::new(),
            ],
            first_kex_packet_follows: false,
            reserved: 0,
        }
    }

    /// Returns the field named `name` (one of [`FIELD_NAMES`]).
    pub fn field(&self, name: &str) -> Option<&[u8]> {
        FIELD_NAMES
            .iter()
            .position(|&field| field == name)
            .map(|index| &self.fields[index][..])
    }

    /// Encodes the message as a packet payload.
    pub fn encode_payload(&self) -> Vec<u8> {
        self.compose_to_vec()
    }

    /// Encodes the message as a complete binary packet without a MAC.
    ///
    /// This is how the first key exchange is sent, before any keys are established.
    pub fn encode_packet(
        &self,
        rng: &mut dyn CryptoRngCore,
        sequence_number: u32,
    ) -> Result<Vec<u8>, PacketError> {
        writer::encode_without_mac(&self.encode_payload(), sequence_number, rng)
    }

    /// Decodes a message from a packet payload.
    ///
    /// Every field is read with its own length prefix. Trailing bytes are ignored.
    pub fn decode(payload: &[u8]) -> Result<KexInit, KexInitError> {
        let ParsedValue {
            value: message_number,
            rest_input,
        } = parse::byte(payload).map_err(|_| KexInitError::NotAKexInitMessage)?;

        if message_number != SSH_MSG_KEXINIT {
            return Err(KexInitError::NotAKexInitMessage);
        }

        let ParsedValue {
            value: cookie,
            mut rest_input,
        } = parse::bytes_const::<16>(rest_input)
            .map_err(|_| KexInitError::TruncatedField { field: "cookie" })?;

        let mut fields: [Vec<u8>; 10] = Default::default();
        for (field, name) in fields.iter_mut().zip(FIELD_NAMES) {
            let parsed = parse::string(rest_input)
                .map_err(|_| KexInitError::TruncatedField { field: name })?;

            *field = parsed.value.to_vec();
            rest_input = parsed.rest_input;
        }

        let ParsedValue {
            value: first_kex_packet_follows,
            rest_input,
        } = parse::boolean(rest_input).map_err(|_| KexInitError::TruncatedField {
            field: "first_kex_packet_follows",
        })?;
        let ParsedValue {
            value: reserved, ..
        } = parse::uint32(rest_input)
            .map_err(|_| KexInitError::TruncatedField { field: "reserved" })?;

        Ok(KexInit {
            cookie,
            fields,
            first_kex_packet_follows,
            reserved,
        })
    }
}

impl Compose for KexInit {
    fn compose(&self, output: &mut impl Write) -> io::Result<()> {
        write::byte(SSH_MSG_KEXINIT, output)?;
        write::bytes(&self.cookie, output)?;
        for field in &self.fields {
            write::string(field, output)?;
        }
        write::boolean(self.first_kex_packet_follows, output)?;
        write::uint32(self.reserved, output)
    }
}

#[cfg(test)]
mod tests {
    use algorithms::mac;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::parser::decode;

    fn proposal() -> KexInit {
        let mut rng = ChaCha20Rng::from_seed(Default::default());

        KexInit::new(
            &mut rng,
            &AlgorithmLists {
                kex: &["curve25519-sha256", "ecdh-sha2-nistp256"],
                server_host_key: &["ssh-ed25519"],
                encryption: &["aes128-ctr"],
                mac: &["hmac-sha2-256", "hmac-sha1"],
                compression: &["none"],
            },
        )
    }

    #[test]
    fn encode_decode() {
        let kexinit = proposal();
        let payload = kexinit.encode_payload();

        assert_eq!(payload[0], 0x14);
        assert_eq!(&payload[1..17], &kexinit.cookie);
        assert_eq!(
            &payload[17..21 + 36],
            &b"\x00\x00\x00\x24curve25519-sha256,ecdh-sha2-nistp256"[..]
        );
        assert_eq!(&payload[payload.len() - 5..], &[0, 0, 0, 0, 0]);

        assert_eq!(KexInit::decode(&payload), Ok(kexinit));
    }

    #[test]
    fn fields_have_independent_lengths() {
        let mut kexinit = KexInit::default();
        for (index, field) in kexinit.fields.iter_mut().enumerate() {
            *field = vec![b'a' + index as u8; index * 3 + 1];
        }
        kexinit.first_kex_packet_follows = true;
        kexinit.reserved = 0xdeadbeef;

        let decoded = KexInit::decode(&kexinit.encode_payload()).unwrap();

        assert_eq!(decoded, kexinit);
        assert_eq!(decoded.field("languages_server_to_client"), Some(&[b'j'; 28][..]));
    }

    #[test]
    fn field_lookup_and_name_list() {
        let kexinit = proposal();

        assert_eq!(
            name_list(kexinit.field("mac_algorithms_server_to_client").unwrap()),
            vec!["hmac-sha2-256", "hmac-sha1"]
        );
        assert_eq!(
            name_list(kexinit.field("languages_client_to_server").unwrap()),
            Vec::<&str>::new()
        );
        assert_eq!(kexinit.field("unknown"), None);
    }

    #[test]
    fn wrong_message_number() {
        let mut payload = proposal().encode_payload();
        payload[0] = 21;

        assert_eq!(
            KexInit::decode(&payload),
            Err(KexInitError::NotAKexInitMessage)
        );
        assert_eq!(KexInit::decode(&[]), Err(KexInitError::NotAKexInitMessage));
    }

    #[test]
    fn truncated_fields() {
        let payload = proposal().encode_payload();

        assert_eq!(
            KexInit::decode(&payload[..10]),
            Err(KexInitError::TruncatedField { field: "cookie" })
        );
        assert_eq!(
            KexInit::decode(&payload[..30]),
            Err(KexInitError::TruncatedField {
                field: "kex_algorithms"
            })
        );
        assert_eq!(
            KexInit::decode(&payload[..payload.len() - 5]),
            Err(KexInitError::TruncatedField {
                field: "first_kex_packet_follows"
            })
        );
        assert_eq!(
            KexInit::decode(&payload[..payload.len() - 2]),
            Err(KexInitError::TruncatedField { field: "reserved" })
        );

        // A declared field length running past the end of the payload.
        let mut payload = payload;
        payload[17..21].copy_from_slice(&0xffffu32.to_be_bytes());
        assert_eq!(
            KexInit::decode(&payload),
            Err(KexInitError::TruncatedField {
                field: "kex_algorithms"
            })
        );
    }

    #[test]
    fn packet_without_mac() {
        let kexinit = proposal();
        let mut rng = ChaCha20Rng::from_seed(Default::default());
        let packet = kexinit.encode_packet(&mut rng, 0).unwrap();

        assert_eq!(packet.len() % 8, 0);

        let payload = decode(&packet, &mac::None, b"", 0).unwrap();
        assert_eq!(KexInit::decode(payload), Ok(kexinit));
    }
}
