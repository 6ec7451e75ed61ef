//! Fisher-Yates shuffling over an injectable random source.
//!
//! Shuffling here takes `&mut impl Rng` instead of hard-coding a source,
//! so a deal can be reproduced exactly from a fixed seed in tests;
//! production call sites pass `rand::rng()`, tests pass a seeded `StdRng`.

use rand::Rng;
use rand::seq::SliceRandom;

/// Shuffle `items` in place using Fisher-Yates via the given RNG.
pub fn shuffle<T>(items: &mut [T], rng: &mut impl Rng) {
    items.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn shuffle_is_deterministic_for_a_fixed_seed() {
        let mut a: Vec<u32> = (0..52).collect();
        let mut b = a.clone();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        shuffle(&mut a, &mut rng_a);
        shuffle(&mut b, &mut rng_b);

        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..52).collect();
        let original = items.clone();
        let mut rng = StdRng::seed_from_u64(1);
        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        let mut original_sorted = original.clone();
        original_sorted.sort_unstable();
        assert_eq!(sorted, original_sorted);
        assert_ne!(items, original, "extremely unlikely to shuffle to itself");
    }
}
