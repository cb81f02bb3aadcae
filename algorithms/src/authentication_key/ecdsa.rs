//! Provides implementations of the "ecdsa-sha2-nistpXXX" key types.
//!
//! See [RFC 5656 section 3](https://tools.ietf.org/html/rfc5656#section-3).

use std::fmt;

use definitions::{
    algorithms::{AuthenticationKey, KeyType},
    KeyError,
};
use signature::Signer as _;
use ssh_key::PrivateKey;

use super::openssh;

macro_rules! impl_ecdsa {
    ($name_str:expr, $name:ident) => {
        #[doc = "Implements the `"]
        #[doc = $name_str]
        #[doc = "` key type for OpenSSH formatted private keys."]
        #[doc = ""]
        #[doc = "The existence of this struct is controlled by the `"]
        #[doc = $name_str]
        #[doc = "` feature."]
        #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
        pub struct $name;

        impl KeyType for $name {
            fn name(&self) -> &'static str {
                $name_str
            }

            fn is_encrypted(&self, private_key: &[u8]) -> Result<bool, KeyError> {
                Ok(openssh::parse(private_key)?.is_encrypted())
            }

            fn load_private_key(
                &self,
                private_key: &[u8],
                passphrase: Option<&[u8]>,
            ) -> Result<Box<dyn AuthenticationKey>, KeyError> {
                EcdsaKey::load($name_str, private_key, passphrase)
                    .map(|key| Box::new(key) as Box<dyn AuthenticationKey>)
            }
        }
    };
}

#[cfg(feature = "ecdsa-sha2-nistp256")]
impl_ecdsa!("ecdsa-sha2-nistp256", EcdsaNistP256);

#[cfg(feature = "ecdsa-sha2-nistp384")]
impl_ecdsa!("ecdsa-sha2-nistp384", EcdsaNistP384);

/// A loaded ECDSA private key.
pub struct EcdsaKey {
    /// The key type name, which is also the signature algorithm.
    name: &'static str,
    /// The decrypted key.
    private_key: PrivateKey,
    /// The encoded public key.
    public_key_blob: Vec<u8>,
}

impl EcdsaKey {
    /// Loads a key of the key type `name`.
    fn load(
        name: &'static str,
        private_key: &[u8],
        passphrase: Option<&[u8]>,
    ) -> Result<EcdsaKey, KeyError> {
        let private_key = openssh::load(name, private_key, passphrase)?;

        if private_key.key_data().ecdsa().is_none() {
            return Err(KeyError::InvalidKeyFormat(format!(
                "expected {} key, found {}",
                name,
                private_key.algorithm()
            )));
        }

        Ok(EcdsaKey {
            name,
            public_key_blob: openssh::public_key_blob(&private_key)?,
            private_key,
        })
    }
}

impl fmt::Debug for EcdsaKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EcdsaKey")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl AuthenticationKey for EcdsaKey {
    fn key_type(&self) -> &'static str {
        self.name
    }

    fn public_key_blob(&self) -> Vec<u8> {
        self.public_key_blob.clone()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        let signature: ssh_key::Signature = self
            .private_key
            .try_sign(data)
            .map_err(|err| KeyError::Signing(err.to_string()))?;

        // The signature data already holds the encoded `mpint r` and `mpint s`.
        Ok(openssh::encode_signature(self.name, signature.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::parse;
    use ssh_key::{Algorithm, PublicKey, Signature};

    fn blob(public_key: &str) -> Vec<u8> {
        PublicKey::from_openssh(public_key)
            .unwrap()
            .to_bytes()
            .unwrap()
    }

    fn verify(public_key: &str, data: &[u8], signature: &[u8]) {
        let public_key = PublicKey::from_openssh(public_key).unwrap();

        let algorithm = parse::string(signature).unwrap();
        assert_eq!(algorithm.value, public_key.algorithm().as_str().as_bytes());
        let raw_signature = parse::string(algorithm.rest_input).unwrap();
        assert!(raw_signature.rest_input.is_empty());

        let signature = Signature::new(
            Algorithm::new(std::str::from_utf8(algorithm.value).unwrap()).unwrap(),
            raw_signature.value.to_vec(),
        )
        .unwrap();

        assert!(signature::Verifier::verify(&public_key, data, &signature).is_ok());
        assert!(signature::Verifier::verify(&public_key, b"other data", &signature).is_err());
    }

    #[cfg(feature = "ecdsa-sha2-nistp256")]
    #[test]
    fn nistp256_loads_and_signs() {
        let file = include_str!("../../testdata/id_ecdsa256");
        let public_key = include_str!("../../testdata/id_ecdsa256.pub");

        assert_eq!(EcdsaNistP256.is_encrypted(file.as_bytes()), Ok(false));

        let key = EcdsaNistP256.load_private_key(file.as_bytes(), None).unwrap();

        assert_eq!(key.key_type(), "ecdsa-sha2-nistp256");
        assert_eq!(key.signature_algorithm(), "ecdsa-sha2-nistp256");
        assert_eq!(key.public_key_blob(), blob(public_key));

        verify(public_key, b"session data", &key.sign(b"session data").unwrap());
    }

    #[cfg(feature = "ecdsa-sha2-nistp384")]
    #[test]
    fn nistp384_requires_passphrase() {
        let file = include_str!("../../testdata/id_ecdsa384").as_bytes();
        let public_key = include_str!("../../testdata/id_ecdsa384.pub");

        assert_eq!(EcdsaNistP384.is_encrypted(file), Ok(true));
        assert_eq!(
            EcdsaNistP384.load_private_key(file, None).err(),
            Some(KeyError::PassphraseRequired)
        );
        assert!(matches!(
            EcdsaNistP384.load_private_key(file, Some(b"wrong")),
            Err(KeyError::InvalidKeyFormat(_))
        ));

        let key = EcdsaNistP384
            .load_private_key(file, Some(b"hunter2"))
            .unwrap();

        assert_eq!(key.key_type(), "ecdsa-sha2-nistp384");
        assert_eq!(key.public_key_blob(), blob(public_key));

        verify(public_key, b"session data", &key.sign(b"session data").unwrap());
    }

    #[cfg(all(feature = "ecdsa-sha2-nistp256", feature = "ecdsa-sha2-nistp384"))]
    #[test]
    fn curves_are_not_interchangeable() {
        let nistp256 = include_str!("../../testdata/id_ecdsa256");

        assert!(matches!(
            EcdsaNistP384.load_private_key(nistp256.as_bytes(), None),
            Err(KeyError::InvalidKeyFormat(_))
        ));
    }
}
