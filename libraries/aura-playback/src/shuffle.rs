//! Shuffle order generation
//!
//! Produces the randomized "upcoming" order used by the queue engine.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Uniformly random order of `0..len`, excluding `current`
///
/// Uses Fisher-Yates via [`SliceRandom::shuffle`], so every permutation of the
/// remaining indices is equally likely.
pub fn upcoming_order<R: Rng + ?Sized>(
    len: usize,
    current: Option<usize>,
    rng: &mut R,
) -> VecDeque<usize> {
    let mut indices: Vec<usize> = (0..len).filter(|i| Some(*i) != current).collect();
    indices.shuffle(rng);
    indices.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn excludes_current_and_keeps_everything_else() {
        let mut rng = StdRng::seed_from_u64(7);
        let order = upcoming_order(10, Some(4), &mut rng);

        assert_eq!(order.len(), 9);
        let set: HashSet<usize> = order.iter().copied().collect();
        assert_eq!(set.len(), 9);
        assert!(!set.contains(&4));
        assert!((0..10).filter(|i| *i != 4).all(|i| set.contains(&i)));
    }

    #[test]
    fn no_current_includes_all_indices() {
        let mut rng = StdRng::seed_from_u64(1);
        let order = upcoming_order(5, None, &mut rng);
        let mut sorted: Vec<usize> = order.into_iter().collect();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(upcoming_order(0, None, &mut rng).is_empty());
        assert!(upcoming_order(1, Some(0), &mut rng).is_empty());
    }

    #[test]
    fn first_slot_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<usize, usize> = HashMap::new();

        for _ in 0..3000 {
            let order = upcoming_order(4, Some(0), &mut rng);
            *counts.entry(order[0]).or_default() += 1;
        }

        // Three candidates, ~1000 each
        for index in 1..4 {
            let count = counts.get(&index).copied().unwrap_or(0);
            assert!(
                (800..1200).contains(&count),
                "index {} picked first {} times",
                index,
                count
            );
        }
    }
}
