//! Seeded pseudo-random sequence
//!
//! Every deterministic draw in the crate goes through an explicitly constructed
//! `SeededSequence`. There is no shared global stream: two instances built from
//! the same seed replay the same values, independently of each other.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::DEFAULT_SEED_TOKEN;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash a seed token to a 64-bit seed (FNV-1a over the UTF-8 bytes).
///
/// Stable across platforms and releases, unlike `std::hash`.
pub fn token_seed(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic uniform stream in [0, 1)
#[derive(Debug, Clone)]
pub struct SeededSequence {
    seed: u64,
    rng: Pcg32,
    draws: u64,
}

impl SeededSequence {
    /// Create a sequence from a numeric seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Create a sequence from a seed token. Empty tokens use `DEFAULT_SEED_TOKEN`.
    pub fn from_token(token: &str) -> Self {
        let token = if token.is_empty() {
            DEFAULT_SEED_TOKEN
        } else {
            token
        };
        Self::new(token_seed(token))
    }

    /// Next value in [0, 1)
    pub fn next(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random::<f64>()
    }

    /// Next value in [0, 1) as f32
    pub fn next_f32(&mut self) -> f32 {
        // f64 -> f32 can round up to 1.0 for values just below 1
        (self.next() as f32).min(1.0 - f32::EPSILON / 2.0)
    }

    /// Numeric seed this sequence was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededSequence::from_token("abc1234");
        let mut b = SeededSequence::from_token("abc1234");
        for _ in 0..1000 {
            assert_eq!(a.next().to_bits(), b.next().to_bits());
        }
    }

    #[test]
    fn test_different_tokens_diverge() {
        let mut a = SeededSequence::from_token("abc1234");
        let mut b = SeededSequence::from_token("abc1235");
        let same = (0..32).filter(|_| a.next() == b.next()).count();
        assert!(same < 32);
    }

    #[test]
    fn test_empty_token_uses_default() {
        let mut empty = SeededSequence::from_token("");
        let mut dev = SeededSequence::from_token(DEFAULT_SEED_TOKEN);
        assert_eq!(empty.seed(), dev.seed());
        assert_eq!(empty.next(), dev.next());
    }

    #[test]
    fn test_range_and_draw_count() {
        let mut seq = SeededSequence::new(42);
        for _ in 0..10_000 {
            let v = seq.next();
            assert!((0.0..1.0).contains(&v));
            let f = seq.next_f32();
            assert!((0.0..1.0).contains(&f));
        }
        assert_eq!(seq.draws(), 20_000);
    }

    #[test]
    fn test_token_seed_is_stable() {
        // FNV-1a reference values
        assert_eq!(token_seed(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(token_seed("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = SeededSequence::new(7);
        let mut b = SeededSequence::new(7);
        // Draining one must not affect the other
        for _ in 0..100 {
            a.next();
        }
        let mut fresh = SeededSequence::new(7);
        assert_eq!(b.next(), fresh.next());
    }

    #[test]
    fn test_abc1234_stream_is_pinned() {
        // Any change here changes every generated image for this token
        assert_eq!(token_seed("abc1234"), 0xecb7_05c2_efaf_d6a3);
        let mut seq = SeededSequence::from_token("abc1234");
        let bits: Vec<u64> = (0..4).map(|_| seq.next().to_bits()).collect();
        assert_eq!(
            bits,
            [
                0x3fc9_54af_3eb5_ed10,
                0x3fe0_08bd_7c67_66a5,
                0x3fed_6428_491e_540e,
                0x3fee_86fc_11a8_a458,
            ]
        );
    }
}
