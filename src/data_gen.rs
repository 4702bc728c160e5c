use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest value produced by the random pattern
pub const MAX_RANDOM_VALUE: i32 = 1_000_000;

/// Shape of the input array fed to the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputPattern {
    /// Uniform in `0..=MAX_RANDOM_VALUE`
    Random,
    /// `1..=n`
    Sorted,
    /// `n..=1`
    Reverse,
    /// Sorted, then ~1% of positions swapped at random
    NearlySorted,
}

impl InputPattern {
    pub fn all() -> &'static [InputPattern] {
        &[
            InputPattern::Random,
            InputPattern::Sorted,
            InputPattern::Reverse,
            InputPattern::NearlySorted,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            InputPattern::Random => "random",
            InputPattern::Sorted => "sorted",
            InputPattern::Reverse => "reverse",
            InputPattern::NearlySorted => "nearly-sorted",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == name)
    }
}

/// Deterministic generator for benchmark inputs
#[derive(Debug, Clone)]
pub struct InputGenerator {
    seed: u64,
}

impl InputGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate `size` values of the given pattern. Same seed, same output.
    pub fn generate(&self, pattern: InputPattern, size: usize) -> Vec<i32> {
        match pattern {
            InputPattern::Random => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                (0..size)
                    .map(|_| rng.gen_range(0..=MAX_RANDOM_VALUE))
                    .collect()
            }
            InputPattern::Sorted => (1..=size as i32).collect(),
            InputPattern::Reverse => (1..=size as i32).rev().collect(),
            InputPattern::NearlySorted => {
                let mut values: Vec<i32> = (1..=size as i32).collect();
                if size == 0 {
                    return values;
                }
                let mut rng = StdRng::seed_from_u64(self.seed);
                let swaps = (size / 100).max(1);
                for _ in 0..swaps {
                    let a = rng.gen_range(0..size);
                    let b = rng.gen_range(0..size);
                    values.swap(a, b);
                }
                values
            }
        }
    }

    /// Generate every pattern for one size (parallel)
    pub fn generate_all(&self, size: usize) -> Vec<(InputPattern, Vec<i32>)> {
        InputPattern::all()
            .par_iter()
            .map(|&pattern| (pattern, self.generate(pattern, size)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sorted_and_reverse() {
        let gen = InputGenerator::new(1);
        assert_eq!(gen.generate(InputPattern::Sorted, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(gen.generate(InputPattern::Reverse, 5), vec![5, 4, 3, 2, 1]);
        assert!(gen.generate(InputPattern::Sorted, 0).is_empty());
        assert!(gen.generate(InputPattern::NearlySorted, 0).is_empty());
    }

    #[test]
    fn test_reproducibility() {
        let gen1 = InputGenerator::new(1234);
        let gen2 = InputGenerator::new(1234);
        for &pattern in InputPattern::all() {
            assert_eq!(gen1.generate(pattern, 1000), gen2.generate(pattern, 1000));
        }
    }

    #[test]
    fn test_generate_all_keeps_pattern_order() {
        let gen = InputGenerator::new(42);
        let all = gen.generate_all(100);
        let patterns: Vec<InputPattern> = all.iter().map(|(p, _)| *p).collect();
        assert_eq!(patterns, InputPattern::all());
        for (pattern, values) in &all {
            assert_eq!(values.len(), 100);
            assert_eq!(values, &gen.generate(*pattern, 100));
        }
    }

    #[test]
    fn test_pattern_names_round_trip() {
        for &pattern in InputPattern::all() {
            assert_eq!(InputPattern::from_name(pattern.name()), Some(pattern));
        }
        assert_eq!(InputPattern::from_name("shuffled"), None);
    }

    proptest! {
        #[test]
        fn prop_random_in_range(seed in any::<u64>(), size in 0usize..2000) {
            let values = InputGenerator::new(seed).generate(InputPattern::Random, size);
            prop_assert_eq!(values.len(), size);
            prop_assert!(values.iter().all(|v| (0..=MAX_RANDOM_VALUE).contains(v)));
        }

        #[test]
        fn prop_nearly_sorted_is_permutation(seed in any::<u64>(), size in 1usize..2000) {
            let mut values = InputGenerator::new(seed).generate(InputPattern::NearlySorted, size);
            values.sort_unstable();
            prop_assert_eq!(values, (1..=size as i32).collect::<Vec<_>>());
        }
    }
}
