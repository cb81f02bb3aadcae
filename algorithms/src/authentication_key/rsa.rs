//! Provides an implementation of the "ssh-rsa" key type.
//!
//! Keys of this type sign with "rsa-sha2-256" or "rsa-sha2-512" as described in
//! [RFC 8332](https://tools.ietf.org/html/rfc8332). SHA-1 signatures are not produced.

use std::fmt;

use ::rsa::{Pkcs1v15Sign, RsaPrivateKey};
use definitions::{
    algorithms::{AuthenticationKey, KeyType},
    KeyError,
};
use sha2::{Digest as _, Sha256, Sha512};

use super::openssh;

/// The name of the key type.
const NAME: &str = "ssh-rsa";

/// The hash function an RSA key signs with.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RsaSignatureHash {
    /// Signs with "rsa-sha2-256".
    Sha256,
    /// Signs with "rsa-sha2-512".
    Sha512,
}

impl RsaSignatureHash {
    /// The name of the signature algorithm.
    pub fn algorithm_name(self) -> &'static str {
        match self {
            RsaSignatureHash::Sha256 => "rsa-sha2-256",
            RsaSignatureHash::Sha512 => "rsa-sha2-512",
        }
    }
}

/// Implements the "ssh-rsa" key type for OpenSSH formatted private keys.
///
/// The default signs with "rsa-sha2-512".
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Rsa {
    /// The hash used by loaded keys.
    hash: RsaSignatureHash,
}

impl Rsa {
    /// Creates the key type, with loaded keys signing using `hash`.
    pub fn new(hash: RsaSignatureHash) -> Rsa {
        Rsa { hash }
    }
}

impl Default for Rsa {
    fn default() -> Rsa {
        Rsa::new(RsaSignatureHash::Sha512)
    }
}

impl KeyType for Rsa {
    fn name(&self) -> &'static str {
        NAME
    }

    fn signature_algorithm(&self) -> &'static str {
        self.hash.algorithm_name()
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

        let keypair = key.key_data().rsa().ok_or_else(|| {
            KeyError::InvalidKeyFormat(format!("expected {} key, found {}", NAME, key.algorithm()))
        })?;
        let private_key = RsaPrivateKey::try_from(keypair)
            .map_err(|err| KeyError::InvalidKeyFormat(err.to_string()))?;

        Ok(Box::new(RsaKey {
            private_key,
            public_key_blob: openssh::public_key_blob(&key)?,
            hash: self.hash,
        }))
    }
}

/// A loaded "ssh-rsa" private key.
pub struct RsaKey {
    /// The key used to sign messages.
    private_key: RsaPrivateKey,
    /// The encoded public key.
    public_key_blob: Vec<u8>,
    /// The hash used for signatures.
    hash: RsaSignatureHash,
}

impl fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RsaKey")
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}

impl AuthenticationKey for RsaKey {
    fn key_type(&self) -> &'static str {
        NAME
    }

    fn signature_algorithm(&self) -> &'static str {
        self.hash.algorithm_name()
    }

    fn public_key_blob(&self) -> Vec<u8> {
        self.public_key_blob.clone()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        let signature = match self.hash {
            RsaSignatureHash::Sha256 => self
                .private_key
                .sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(data)),
            RsaSignatureHash::Sha512 => self
                .private_key
                .sign(Pkcs1v15Sign::new::<Sha512>(), &Sha512::digest(data)),
        }
        .map_err(|err| KeyError::Signing(err.to_string()))?;

        Ok(openssh::encode_signature(
            self.hash.algorithm_name(),
            &signature,
        ))
    }
}
