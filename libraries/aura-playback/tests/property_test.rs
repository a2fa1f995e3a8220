//! Property-based tests for the queue engine
//!
//! Uses proptest to verify navigation invariants across random queues and
//! random operation sequences.

use aura_playback::testing::tracks;
use aura_playback::{PlayQueue, RepeatMode};
use proptest::prelude::*;
use std::collections::HashSet;

// ===== Helpers =====

#[derive(Debug, Clone, Copy)]
enum Op {
    Advance,
    Retreat,
    JumpTo(usize),
    ToggleShuffle,
    PeekNext,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Advance),
        3 => Just(Op::Retreat),
        2 => (0usize..64).prop_map(Op::JumpTo),
        1 => Just(Op::ToggleShuffle),
        1 => Just(Op::PeekNext),
    ]
}

fn queue_of(len: usize, start: usize, seed: u64) -> PlayQueue {
    let titles: Vec<String> = (0..len).map(|i| format!("Track {:02}", i)).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();

    let mut queue = PlayQueue::with_seed(seed);
    queue.load(tracks(&refs), start);
    queue
}

fn apply(queue: &mut PlayQueue, op: Op) {
    match op {
        Op::Advance => {
            queue.advance();
        }
        Op::Retreat => {
            queue.retreat();
        }
        Op::JumpTo(i) => {
            if !queue.is_empty() {
                queue.jump_to(i % queue.len());
            }
        }
        Op::ToggleShuffle => {
            queue.toggle_shuffle();
        }
        Op::PeekNext => {
            queue.peek_next();
        }
    }
}

/// `{current} ∪ upcoming ∪ history` is exactly `0..len`, no duplicates
fn shuffle_partition_holds(queue: &PlayQueue) -> bool {
    let Some(state) = queue.shuffle_state() else {
        return true;
    };

    let all: Vec<usize> = queue
        .current_index()
        .into_iter()
        .chain(state.upcoming().iter().copied())
        .chain(state.history().as_slice().iter().copied())
        .collect();
    let unique: HashSet<usize> = all.iter().copied().collect();

    all.len() == queue.len() && unique == (0..queue.len()).collect()
}

// ===== Property Tests =====

proptest! {
    /// Property: cursor is valid iff the queue is non-empty
    #[test]
    fn load_leaves_valid_cursor(len in 0usize..40, start in 0usize..40) {
        let queue = queue_of(len, start.min(len.saturating_sub(1)), 1);

        match queue.current_index() {
            Some(index) => {
                prop_assert!(len > 0);
                prop_assert!(index < len);
            }
            None => prop_assert_eq!(len, 0),
        }
    }

    /// Property: shuffle partition survives any operation sequence
    #[test]
    fn shuffle_partition_is_invariant(
        len in 1usize..30,
        seed in any::<u64>(),
        ops in prop::collection::vec(arbitrary_op(), 1..60)
    ) {
        let mut queue = queue_of(len, 0, seed);
        queue.toggle_shuffle();
        prop_assert!(shuffle_partition_holds(&queue));

        for op in ops {
            apply(&mut queue, op);
            prop_assert!(shuffle_partition_holds(&queue), "broken after {:?}", op);
            prop_assert!(queue.current_index().is_some_and(|i| i < len));
        }
    }

    /// Property: advance then retreat restores the previous index
    #[test]
    fn advance_then_retreat_restores(
        len in 1usize..30,
        seed in any::<u64>(),
        shuffle in any::<bool>(),
        warmup in prop::collection::vec(arbitrary_op(), 0..20)
    ) {
        let mut queue = queue_of(len, 0, seed);
        if shuffle {
            queue.toggle_shuffle();
        }
        for op in warmup {
            apply(&mut queue, op);
        }

        let before = queue.current_index();
        let shuffle_before = queue.shuffle_state().cloned();
        queue.advance();
        queue.retreat();

        prop_assert_eq!(queue.current_index(), before);
        // Only exact when advance didn't refill an exhausted upcoming order
        if let Some(state) = shuffle_before.filter(|s| !s.upcoming().is_empty()) {
            prop_assert_eq!(queue.shuffle_state(), Some(&state));
        }
    }

    /// Property: peek_next is pure and predicts advance
    #[test]
    fn peek_next_is_pure(
        len in 0usize..30,
        seed in any::<u64>(),
        shuffle in any::<bool>(),
        peeks in 1usize..10
    ) {
        let mut queue = queue_of(len, 0, seed);
        if shuffle {
            queue.toggle_shuffle();
        }

        let state_before = queue.shuffle_state().cloned();
        let first = queue.peek_next();
        for _ in 0..peeks {
            prop_assert_eq!(queue.peek_next(), first);
        }
        prop_assert_eq!(queue.shuffle_state().cloned(), state_before);

        if let Some(expected) = first {
            prop_assert_eq!(queue.advance(), Some(expected));
        }
    }

    /// Property: effective order is a permutation of the queue when the
    /// shuffle horizon is fresh
    #[test]
    fn effective_order_is_permutation(len in 0usize..40, seed in any::<u64>(), start in 0usize..40) {
        let mut queue = queue_of(len, start.min(len.saturating_sub(1)), seed);
        queue.toggle_shuffle();

        let mut order = queue.effective_order();
        prop_assert_eq!(order.first().copied(), queue.current_index());
        order.sort_unstable();
        prop_assert_eq!(order, (0..len).collect::<Vec<_>>());
    }

    /// Property: repeat cycling is a 3-cycle
    #[test]
    fn repeat_cycle_returns_home(extra in 0usize..3) {
        let mut queue = PlayQueue::with_seed(0);
        for _ in 0..extra {
            queue.cycle_repeat();
        }
        let start = queue.repeat();
        queue.cycle_repeat();
        queue.cycle_repeat();
        prop_assert_eq!(queue.cycle_repeat(), start);
    }

    /// Property: sequential navigation wraps modulo the queue length
    #[test]
    fn sequential_wraps(len in 1usize..30, steps in 0usize..100) {
        let mut queue = queue_of(len, 0, 0);
        for _ in 0..steps {
            queue.advance();
        }
        prop_assert_eq!(queue.current_index(), Some(steps % len));
    }
}

#[test]
fn default_repeat_is_off() {
    assert_eq!(PlayQueue::with_seed(0).repeat(), RepeatMode::Off);
}
