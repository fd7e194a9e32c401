//! Explored positions and the insertion-ordered set that holds them.
//!
//! Positions are appended level by level, so the set's insertion order is monotone in depth
//! and each depth occupies one contiguous run. That gives cheap per-depth iteration, a stable
//! sequence number per position, and a simple "everything after this mark is unsaved" rule
//! for incremental checkpoints.

use std::collections::TryReserveError;
use std::fmt;
use std::ops::Range;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::oracle::Outcome;

/// Canonical state identity. Opaque to the search; only compared and hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PositionKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One explored position. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub key: PositionKey,
    pub depth: u32,
    /// Arrival move sequence from the root, in oracle notation.
    pub moves: Vec<String>,
    pub outcome: Outcome,
    /// Full-state snapshot, restorable through the oracle.
    pub snapshot: String,
}

impl Position {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    #[inline]
    pub fn is_terminal_loss(&self) -> bool {
        self.outcome == Outcome::LossForMover
    }

    #[inline]
    pub fn is_terminal_draw(&self) -> bool {
        self.outcome == Outcome::Draw
    }
}

/// Identity-keyed positions plus the one-ply edges between consecutive depths.
///
/// Sequence numbers (`seq`) are insertion indices; they are stable for the lifetime of the set
/// and are what edges refer to.
#[derive(Debug, Clone, Default)]
pub struct PositionSet {
    records: Vec<Position>,
    index: FxHashMap<PositionKey, usize>,
    level_starts: Vec<usize>,
    parents: Vec<Vec<usize>>,
    edge_log: Vec<(usize, usize)>,
    committed_records: usize,
    committed_edges: usize,
}

impl PositionSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &PositionKey) -> Option<&Position> {
        self.index.get(key).map(|&seq| &self.records[seq])
    }

    pub fn contains(&self, key: &PositionKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn seq_of(&self, key: &PositionKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    #[inline]
    pub fn by_seq(&self, seq: usize) -> &Position {
        &self.records[seq]
    }

    /// All positions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Position> + '_ {
        self.records.iter()
    }

    /// Deepest depth holding at least one position.
    pub fn max_depth(&self) -> Option<u32> {
        self.records.last().map(|p| p.depth)
    }

    /// Sequence numbers of the positions recorded at `depth`.
    pub fn level(&self, depth: u32) -> Range<usize> {
        let d = depth as usize;
        if d >= self.level_starts.len() {
            return self.records.len()..self.records.len();
        }
        let start = self.level_starts[d];
        let end = self
            .level_starts
            .get(d + 1)
            .copied()
            .unwrap_or(self.records.len());
        start..end
    }

    pub fn positions_at(&self, depth: u32) -> impl Iterator<Item = &Position> + '_ {
        self.records[self.level(depth)].iter()
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.records.try_reserve(additional)?;
        self.parents.try_reserve(additional)?;
        self.index.try_reserve(additional)
    }

    /// Append a position. Returns its sequence number, or `None` if the identity is already
    /// present (the existing record wins).
    ///
    /// Depths must be appended in non-decreasing order.
    pub fn insert(&mut self, position: Position) -> Option<usize> {
        if self.index.contains_key(&position.key) {
            return None;
        }
        debug_assert!(self.max_depth().map_or(true, |d| position.depth >= d));

        let seq = self.records.len();
        while self.level_starts.len() <= position.depth as usize {
            self.level_starts.push(seq);
        }
        self.index.insert(position.key.clone(), seq);
        self.records.push(position);
        self.parents.push(Vec::new());
        Some(seq)
    }

    /// Record a one-ply edge. Duplicates are ignored; returns whether the edge is new.
    pub fn add_edge(&mut self, parent: usize, child: usize) -> bool {
        debug_assert_eq!(self.records[parent].depth + 1, self.records[child].depth);
        let list = &mut self.parents[child];
        if list.contains(&parent) {
            return false;
        }
        list.push(parent);
        self.edge_log.push((parent, child));
        true
    }

    #[inline]
    pub fn parents_of(&self, child: usize) -> &[usize] {
        &self.parents[child]
    }

    pub fn edge_count(&self) -> usize {
        self.edge_log.len()
    }

    /// Every edge as `(parent, child)` sequence numbers, in recording order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edge_log.iter().copied()
    }

    /// Positions appended since the last [`PositionSet::mark_committed`].
    pub fn pending_positions(&self) -> &[Position] {
        &self.records[self.committed_records..]
    }

    /// Edges recorded since the last [`PositionSet::mark_committed`], as keys.
    pub fn pending_edges(&self) -> impl Iterator<Item = (&PositionKey, &PositionKey)> + '_ {
        self.edge_log[self.committed_edges..]
            .iter()
            .map(|&(p, c)| (&self.records[p].key, &self.records[c].key))
    }

    pub fn has_pending(&self) -> bool {
        self.committed_records < self.records.len() || self.committed_edges < self.edge_log.len()
    }

    /// Drop every position deeper than `depth` together with the edges into them.
    ///
    /// Levels are contiguous, so this is a suffix cut; surviving sequence numbers keep their
    /// meaning.
    pub fn truncate_to_depth(&mut self, depth: u32) {
        let keep = depth as usize + 1;
        if keep >= self.level_starts.len() {
            return;
        }
        let cut = self.level_starts[keep];
        for dropped in self.records.drain(cut..) {
            self.index.remove(&dropped.key);
        }
        self.parents.truncate(cut);
        self.level_starts.truncate(keep);

        let committed_kept = self.edge_log[..self.committed_edges]
            .iter()
            .filter(|&&(_, child)| child < cut)
            .count();
        self.edge_log.retain(|&(_, child)| child < cut);
        self.committed_edges = committed_kept;
        self.committed_records = self.committed_records.min(cut);
    }

    /// Declare everything recorded so far durable.
    pub fn mark_committed(&mut self) {
        self.committed_records = self.records.len();
        self.committed_edges = self.edge_log.len();
    }
}

impl PartialEq for PositionSet {
    /// Content equality: same records in the same order with the same edges. Commit marks
    /// are bookkeeping and are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records && self.parents == other.parents
    }
}

impl Eq for PositionSet {}
