//! Backward decrement propagation.
//!
//! Every barrier position (terminal loss or dead end) closes one continuation of each of its
//! parents, whichever side is to move there. A non-terminal parent whose last continuation
//! closes becomes a dead end and propagates further back. Each position is processed at most
//! once, so the worklist drains after at most one visit per position plus one per edge.

use std::collections::VecDeque;

use crate::position::PositionSet;
use crate::retro::counts::MoveCounts;
use crate::retro::parents::ParentIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Sequence numbers in the order they became dead ends.
    pub dead_ends: Vec<usize>,
    /// Worklist pops, including skipped duplicates.
    pub iterations: u64,
}

/// Drain the worklist seeded with `seeds`. Duplicate seeds are skipped.
pub fn propagate(
    set: &PositionSet,
    index: &ParentIndex,
    counts: &mut MoveCounts,
    seeds: &[usize],
) -> Propagation {
    let n = set.len();
    let mut processed = vec![false; n];
    let mut dead = vec![false; n];
    let mut queue: VecDeque<usize> = seeds.iter().copied().collect();
    let mut out = Propagation::default();

    while let Some(p) = queue.pop_front() {
        out.iterations += 1;
        if processed[p] {
            continue;
        }
        processed[p] = true;

        for &q in index.parents(p) {
            if counts.decrement(q) != Some(0) {
                continue;
            }
            if set.by_seq(q).is_terminal() || dead[q] {
                continue;
            }
            dead[q] = true;
            out.dead_ends.push(q);
            queue.push_back(q);
        }
    }

    out
}
