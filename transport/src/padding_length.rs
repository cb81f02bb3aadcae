//! Aids with customization of the padding lengths for outgoing packets.

use definitions::CryptoRngCore;
use rand::distributions::Distribution;
use rand_distr::Gamma;

use crate::constants::MAX_EXTRA_PADDING_BLOCKS;

/// Defines a padding length distribution.
///
/// It is a function that, given a random number generator, returns the number of additional
/// (non-needed) "blocks" of padding to add on top of the minimal padding.
///
/// A "block" of padding is 8 bytes, the alignment of packets without a cipher, as defined in
/// [RFC4253](https://tools.ietf.org/html/rfc4253#section-6).
///
/// Randomizing this number makes it harder for observers to infer the payload length from the
/// packet length, at the cost of network capacity.
///
/// Values that would overflow the `padding_length` field are cropped, so any returned value is
/// valid.
pub type PaddingLengthDistribution = dyn FnMut(&mut dyn CryptoRngCore) -> u8 + Send;

/// Returns a distribution that adds a small random number of padding blocks.
///
/// The number of extra blocks follows a gamma distribution with shape `0.5` and scale `3.0`:
/// roughly 44% of packets get no extra block, 90% get at most five.
pub fn randomized_distribution() -> Box<PaddingLengthDistribution> {
    let gamma = Gamma::new(0.5, 3.0).expect("gamma parameters are valid");

    Box::new(move |rng| {
        let mut float: f64 = gamma.sample(rng);
        while float > MAX_EXTRA_PADDING_BLOCKS as f64 {
            float = gamma.sample(rng);
        }

        float.clamp(0.0, MAX_EXTRA_PADDING_BLOCKS as f64).round() as u8
    })
}

/// Returns the distribution that never adds extra padding.
///
/// This is the default, so every packet carries the smallest legal padding.
pub fn minimal_distribution() -> Box<PaddingLengthDistribution> {
    Box::new(|_| 0)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    #[test]
    fn randomized_stays_in_range() {
        let mut rng = ChaCha20Rng::from_seed(Default::default());
        let mut distr = randomized_distribution();

        let samples: Vec<u8> = (0..10_000).map(|_| distr(&mut rng)).collect();

        assert!(samples
            .iter()
            .all(|&blocks| blocks as usize <= MAX_EXTRA_PADDING_BLOCKS));
        assert!(samples.iter().any(|&blocks| blocks == 0));
        assert!(samples.iter().any(|&blocks| blocks > 0));
    }

    #[test]
    fn minimal_is_zero() {
        let mut rng = ChaCha20Rng::from_seed(Default::default());
        let mut distr = minimal_distribution();

        assert!((0..100).all(|_| distr(&mut rng) == 0));
    }
}
