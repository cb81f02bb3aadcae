//! Reads OpenSSH formatted private key files.

use definitions::KeyError;
use log::debug;
use ssh_key::{Algorithm, PrivateKey};

/// Parses the contents of an OpenSSH private key file.
pub(super) fn parse(private_key: &[u8]) -> Result<PrivateKey, KeyError> {
    PrivateKey::from_openssh(private_key).map_err(|err| KeyError::InvalidKeyFormat(err.to_string()))
}

/// Parses and if needed decrypts an OpenSSH private key file holding a key of type `name`.
pub(super) fn load(
    name: &str,
    private_key: &[u8],
    passphrase: Option<&[u8]>,
) -> Result<PrivateKey, KeyError> {
    let mut key = parse(private_key)?;

    if key.algorithm() != expected_algorithm(name)? {
        return Err(KeyError::InvalidKeyFormat(format!(
            "expected {} key, found {}",
            name,
            key.algorithm()
        )));
    }

    if key.is_encrypted() {
        let passphrase = passphrase.ok_or(KeyError::PassphraseRequired)?;

        debug!("decrypting {} private key", name);
        key = key
            .decrypt(passphrase)
            .map_err(|err| KeyError::InvalidKeyFormat(err.to_string()))?;
    }

    Ok(key)
}

/// The key algorithm of the key type `name`.
fn expected_algorithm(name: &str) -> Result<Algorithm, KeyError> {
    Algorithm::new(name).map_err(|err| KeyError::InvalidKeyFormat(err.to_string()))
}

/// The public key of `key` in SSH wire encoding.
#[cfg(any(
    feature = "ssh-rsa",
    feature = "ecdsa-sha2-nistp256",
    feature = "ecdsa-sha2-nistp384"
))]
pub(super) fn public_key_blob(key: &PrivateKey) -> Result<Vec<u8>, KeyError> {
    key.public_key()
        .to_bytes()
        .map_err(|err| KeyError::InvalidKeyFormat(err.to_string()))
}

/// Encodes a signature as `string algorithm` followed by `string signature`.
#[cfg(any(
    feature = "ssh-rsa",
    feature = "ecdsa-sha2-nistp256",
    feature = "ecdsa-sha2-nistp384"
))]
pub(super) fn encode_signature(algorithm: &str, signature: &[u8]) -> Vec<u8> {
    use definitions::write;

    let mut result = Vec::with_capacity(8 + algorithm.len() + signature.len());

    // Writing into a `Vec` cannot fail.
    write::string(algorithm.as_bytes(), &mut result).expect("vec write");
    write::string(signature, &mut result).expect("vec write");

    result
}
