//! Provides an implementation of the "ssh-ed25519" key type.

use std::fmt;

use definitions::{
    algorithms::{AuthenticationKey, KeyType},
    KeyError,
};
use ed25519_dalek::{Signer as _, SigningKey};
use zeroize::Zeroizing;

use super::openssh;

/// The name of the key type.
const NAME: &str = "ssh-ed25519";

/// The prefix used for a signature.
///
/// The encoding of the signature is:
///
/// ```text,no_run
/// string "ssh-ed25519"
/// string signature
/// ```
const SIGNATURE_PREFIX: &[u8] = b"\x00\x00\x00\x0bssh-ed25519\x00\x00\x00\x40";

/// The prefix used for a public key.
///
/// The encoding of the public key is:
///
/// ```text,no_run
/// string "ssh-ed25519"
/// string public_key
/// ```
const PUBLIC_KEY_PREFIX: &[u8] = b"\x00\x00\x00\x0bssh-ed25519\x00\x00\x00\x20";

/// Implements the "ssh-ed25519" key type for OpenSSH formatted private keys.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Ed25519;

impl KeyType for Ed25519 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_encrypted(&self, private_key: &[u8]) -> Result<bool, KeyError> {
        Ok(openssh::parse(private_key)?.is_encrypted())
    }

    fn load_private_key(
        &self,
        private_key: &[u8],
        passphrase: Option<&[u8]>,
    ) -> Result<Box<dyn AuthenticationKey>, KeyError> {
        let key = openssh::load(NAME, private_key, passphrase)?;

        let keypair = key.key_data().ed25519().ok_or_else(|| {
            KeyError::InvalidKeyFormat(format!("expected {} key, found {}", NAME, key.algorithm()))
        })?;

        let seed = Zeroizing::new(keypair.private.to_bytes());
        let signing_key = SigningKey::from_bytes(&seed);

        if signing_key.verifying_key().as_bytes() != &keypair.public.0 {
            return Err(KeyError::InvalidKeyFormat(
                "public key does not match private key".to_owned(),
            ));
        }

        Ok(Box::new(Ed25519Key { signing_key }))
    }
}

/// A loaded "ssh-ed25519" private key.
pub struct Ed25519Key {
    /// The key used to sign messages.
    signing_key: SigningKey,
}

impl Ed25519Key {
    /// Creates a key from a 32 byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Ed25519Key {
        Ed25519Key {
            signing_key: SigningKey::from_bytes(seed),
        }
    }
}

impl fmt::Debug for Ed25519Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Ed25519Key")
            .field("public_key", &self.signing_key.verifying_key().as_bytes())
            .finish_non_exhaustive()
    }
}

impl AuthenticationKey for Ed25519Key {
    fn key_type(&self) -> &'static str {
        NAME
    }

    fn public_key_blob(&self) -> Vec<u8> {
        let mut blob = PUBLIC_KEY_PREFIX.to_vec();
        blob.extend_from_slice(self.signing_key.verifying_key().as_bytes());

        blob
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        let signature = self
            .signing_key
            .try_sign(data)
            .map_err(|err| KeyError::Signing(err.to_string()))?;

        let mut result = SIGNATURE_PREFIX.to_vec();
        result.extend_from_slice(&signature.to_bytes());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};
    use rand_chacha::{rand_core::SeedableRng as _, ChaCha20Rng};
    use ssh_key::{private::Ed25519Keypair, LineEnding, PrivateKey};

    const SEED: [u8; 32] = [7; 32];

    fn openssh_key(passphrase: Option<&str>) -> String {
        let keypair = Ed25519Keypair::from_seed(&SEED);
        let mut key = PrivateKey::new(keypair.into(), "user@example.com").unwrap();

        if let Some(passphrase) = passphrase {
            let mut rng = ChaCha20Rng::from_seed(Default::default());
            key = key.encrypt(&mut rng, passphrase).unwrap();
        }

        key.to_openssh(LineEnding::LF).unwrap().to_string()
    }

    #[test]
    fn loads_unencrypted_key() {
        let file = openssh_key(None);

        assert_eq!(Ed25519.is_encrypted(file.as_bytes()), Ok(false));

        let key = Ed25519.load_private_key(file.as_bytes(), None).unwrap();

        assert_eq!(key.key_type(), "ssh-ed25519");
        assert_eq!(
            key.public_key_blob(),
            Ed25519Key::from_seed(&SEED).public_key_blob()
        );
    }

    #[test]
    fn encrypted_key_requires_passphrase() {
        let file = openssh_key(Some("hunter2"));

        assert_eq!(Ed25519.is_encrypted(file.as_bytes()), Ok(true));
        assert_eq!(
            Ed25519.load_private_key(file.as_bytes(), None).err(),
            Some(KeyError::PassphraseRequired)
        );
        assert!(matches!(
            Ed25519.load_private_key(file.as_bytes(), Some(b"wrong")),
            Err(KeyError::InvalidKeyFormat(_))
        ));

        let key = Ed25519
            .load_private_key(file.as_bytes(), Some(b"hunter2"))
            .unwrap();
        assert_eq!(
            key.public_key_blob(),
            Ed25519Key::from_seed(&SEED).public_key_blob()
        );
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            Ed25519.load_private_key(b"not a key", None),
            Err(KeyError::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn signature_verifies() {
        let key = Ed25519Key::from_seed(&SEED);
        let blob = key.public_key_blob();
        let signature = key.sign(b"session data").unwrap();

        assert_eq!(&blob[..PUBLIC_KEY_PREFIX.len()], PUBLIC_KEY_PREFIX);
        assert_eq!(&signature[..SIGNATURE_PREFIX.len()], SIGNATURE_PREFIX);

        let mut public = [0; 32];
        public.copy_from_slice(&blob[PUBLIC_KEY_PREFIX.len()..]);
        let mut raw_signature = [0; 64];
        raw_signature.copy_from_slice(&signature[SIGNATURE_PREFIX.len()..]);

        let verifying_key = VerifyingKey::from_bytes(&public).unwrap();
        assert!(verifying_key
            .verify(b"session data", &Signature::from_bytes(&raw_signature))
            .is_ok());
    }
}
