//! Provides implementations of the "hmac-shaX(-XXX)" MAC algorithms.

use definitions::algorithms::MacAlgorithm;
use hmac::{digest::OutputSizeUser, Hmac, Mac};

macro_rules! impl_hmac_sha {
    ($name_str:expr, $name:ident, $alg:ty, $key_size:expr) => {
        #[doc = "Implements the `"]
        #[doc = $name_str]
        #[doc = "` MAC algorithm."]
        #[doc = ""]
        #[doc = "The existence of this struct is controlled by the `"]
        #[doc = $name_str]
        #[doc = "` feature."]
        #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
        pub struct $name;

        impl MacAlgorithm for $name {
            fn name(&self) -> &'static str {
                $name_str
            }

            fn mac_length(&self) -> usize {
                <$alg as OutputSizeUser>::output_size()
            }

            fn key_length(&self) -> usize {
                $key_size
            }

            fn compute_mac(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
                let mut alg = <Hmac<$alg> as Mac>::new_from_slice(key)
                    .expect("HMAC can take any key size");

                alg.update(data);

                alg.finalize().into_bytes().to_vec()
            }

            fn check_mac(&self, key: &[u8], data: &[u8], candidate: &[u8]) -> bool {
                let mut alg = <Hmac<$alg> as Mac>::new_from_slice(key)
                    .expect("HMAC can take any key size");

                alg.update(data);

                // `verify_slice` compares in constant time.
                alg.verify_slice(candidate).is_ok()
            }
        }
    };
}

#[cfg(feature = "hmac-sha1")]
impl_hmac_sha!("hmac-sha1", HmacSha1, sha1::Sha1, 20);

#[cfg(feature = "hmac-sha2-256")]
impl_hmac_sha!("hmac-sha2-256", HmacSha2256, sha2::Sha256, 32);

#[cfg(feature = "hmac-sha2-512")]
impl_hmac_sha!("hmac-sha2-512", HmacSha2512, sha2::Sha512, 64);
