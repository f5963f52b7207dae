//! Injected randomness.
//!
//! Every random decision in the crate (initial placement, tick order, tie
//! breaks) draws from a [`RandomSource`]. Any `rand` generator works; tests
//! that need to force a particular order use [`ScriptedRandom`].

use rand::{Rng, RngCore};
use std::collections::VecDeque;

/// Uniform integer source.
pub trait RandomSource {
    /// Draw a value uniformly from `0..bound`.
    ///
    /// `bound` is always at least 1 when called from this crate.
    fn below(&mut self, bound: usize) -> usize;
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.gen_range(0..bound)
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`].
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// Pick one element uniformly, or `None` if the slice is empty.
pub fn choose<'a, T, R: RandomSource + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.below(items.len()))
}

/// A source that replays a fixed list of draws.
///
/// Each draw is reduced modulo the requested bound. Requests with a bound
/// of 0 or 1 have only one answer and do not consume a draw. Once the
/// script runs out every draw returns 0, which makes [`shuffle`] swap each
/// element with the front and [`choose`] take the first candidate.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<usize>,
}

impl ScriptedRandom {
    /// Create a source that replays `draws` in order.
    #[must_use]
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Number of scripted draws not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.draws.pop_front().map_or(0, |d| d % bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_std_rng_below_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for bound in 1..50 {
            assert!(rng.below(bound) < bound);
        }
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut items: Vec<u32> = (0..32).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_same_seed_same_order() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        shuffle(&mut a, &mut StdRng::seed_from_u64(99));
        shuffle(&mut b, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_scripted_shuffle_keeps_order_with_top_draws() {
        // Drawing i at each step swaps i with itself.
        let mut items = vec!['a', 'b', 'c'];
        let mut rng = ScriptedRandom::new([2, 1]);
        shuffle(&mut items, &mut rng);
        assert_eq!(items, vec!['a', 'b', 'c']);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_scripted_exhausted_draws_zero() {
        let mut items = vec![1, 2, 3];
        let mut rng = ScriptedRandom::default();
        shuffle(&mut items, &mut rng);
        // i=2 swaps with 0 -> [3,2,1]; i=1 swaps with 0 -> [2,3,1]
        assert_eq!(items, vec![2, 3, 1]);
    }

    #[test]
    fn test_choose() {
        let mut rng = ScriptedRandom::new([4]);
        assert_eq!(choose(&[10, 20, 30], &mut rng), Some(&20));
        assert_eq!(choose::<u8, _>(&[], &mut rng), None);
    }

    #[test]
    fn test_scripted_single_choice_keeps_draws() {
        let mut rng = ScriptedRandom::new([1]);
        assert_eq!(choose(&['x'], &mut rng), Some(&'x'));
        assert_eq!(rng.remaining(), 1);
    }
}
