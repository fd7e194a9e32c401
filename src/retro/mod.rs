//! Retrograde decrement analysis over an explored [`PositionSet`].
//!
//! Four phases, each linear in positions plus edges (phase A also costs one move generation
//! per non-terminal position):
//!
//! 1. classify: initial continuation counts; terminals get zero.
//! 2. index: child -> parents from the recorded one-ply edges.
//! 3. propagate: seed with every terminal loss and drain the decrement worklist.
//! 4. aggregate: per-depth barrier and refined ratios.
//!
//! The analysis never changes the set; it only reads it.

pub mod counts;
pub mod parents;
pub mod propagate;
pub mod report;
pub mod stats;

use log::{debug, info};
use serde::Serialize;

use crate::error::SearchError;
use crate::oracle::RuleOracle;
use crate::position::{PositionKey, PositionSet};

pub use counts::MoveCounts;
pub use parents::ParentIndex;
pub use propagate::{propagate, Propagation};
pub use stats::{BarrierVerdict, DepthStats, Ratio};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootSummary {
    pub key: PositionKey,
    pub initial_moves: u32,
    pub current_moves: u32,
    pub terminal_loss: bool,
    pub dead_end: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// `None` when the requested root is not in the set.
    pub root: Option<RootSummary>,
    /// Terminal losses in sequence order.
    pub terminal_losses: Vec<PositionKey>,
    /// Dead ends in the order propagation discovered them.
    pub dead_ends: Vec<PositionKey>,
    /// One entry per depth `0..=max_depth`.
    pub depth_stats: Vec<DepthStats>,
    /// Shallowest depth holding a dead end.
    pub propagation_depth: Option<u32>,
    pub worklist_iterations: u64,
    #[serde(skip)]
    pub counts: MoveCounts,
}

impl Analysis {
    /// `(initial, current)` continuation counts for `key`.
    pub fn counts_of(&self, set: &PositionSet, key: &PositionKey) -> Option<(u32, u32)> {
        let seq = set.seq_of(key)?;
        (seq < self.counts.len()).then(|| (self.counts.initial(seq), self.counts.current(seq)))
    }

    pub fn stats_at(&self, depth: u32) -> Option<&DepthStats> {
        self.depth_stats.get(depth as usize)
    }

    pub fn is_dead_end(&self, key: &PositionKey) -> bool {
        self.dead_ends.contains(key)
    }
}

/// Initial continuation count per position: zero for terminals, the oracle's legal move count
/// otherwise.
pub fn initial_counts<O: RuleOracle>(
    oracle: &O,
    set: &PositionSet,
) -> Result<MoveCounts, SearchError> {
    let mut initial: Vec<u32> = Vec::new();
    initial
        .try_reserve_exact(set.len())
        .map_err(|_| SearchError::AllocationFailed {
            stage: "classify",
            structure: "initial_move_counts",
        })?;

    for position in set.iter() {
        let count = if position.is_terminal() {
            0
        } else {
            let state = oracle.restore(&position.snapshot)?;
            u32::try_from(oracle.legal_moves(&state)?.len()).unwrap_or(u32::MAX)
        };
        initial.push(count);
    }
    MoveCounts::from_initial(initial)
}

/// Run the full analysis for the set explored from `root`.
pub fn analyze<O: RuleOracle>(
    oracle: &O,
    set: &PositionSet,
    root: &PositionKey,
) -> Result<Analysis, SearchError> {
    info!("retrograde analysis over {} positions", set.len());

    let mut counts = initial_counts(oracle, set)?;
    let losses: Vec<usize> = (0..set.len())
        .filter(|&seq| set.by_seq(seq).is_terminal_loss())
        .collect();
    info!("  {} terminal losses", losses.len());

    let index = ParentIndex::build(set)?;
    debug!("  parent index: {} edges", index.edge_count());

    let propagation = propagate(set, &index, &mut counts, &losses);
    info!(
        "  {} dead ends after {} worklist iterations",
        propagation.dead_ends.len(),
        propagation.iterations
    );

    let depth_stats = aggregate(set, &counts, &losses, &propagation.dead_ends);
    let propagation_depth = propagation
        .dead_ends
        .iter()
        .map(|&seq| set.by_seq(seq).depth)
        .min();

    let root = set.seq_of(root).map(|seq| {
        let p = set.by_seq(seq);
        RootSummary {
            key: p.key.clone(),
            initial_moves: counts.initial(seq),
            current_moves: counts.current(seq),
            terminal_loss: p.is_terminal_loss(),
            dead_end: propagation.dead_ends.contains(&seq),
        }
    });

    Ok(Analysis {
        root,
        terminal_losses: losses.iter().map(|&s| set.by_seq(s).key.clone()).collect(),
        dead_ends: propagation
            .dead_ends
            .iter()
            .map(|&s| set.by_seq(s).key.clone())
            .collect(),
        depth_stats,
        propagation_depth,
        worklist_iterations: propagation.iterations,
        counts,
    })
}

fn aggregate(
    set: &PositionSet,
    counts: &MoveCounts,
    losses: &[usize],
    dead_ends: &[usize],
) -> Vec<DepthStats> {
    let Some(max_depth) = set.max_depth() else {
        return Vec::new();
    };
    let mut stats: Vec<DepthStats> = (0..=max_depth).map(DepthStats::empty).collect();

    for (seq, position) in set.iter().enumerate() {
        let s = &mut stats[position.depth as usize];
        s.positions += 1;
        s.initial_moves += u64::from(counts.initial(seq));
        s.current_moves += u64::from(counts.current(seq));
    }
    for &seq in losses {
        stats[set.by_seq(seq).depth as usize].terminal_losses += 1;
    }
    for &seq in dead_ends {
        stats[set.by_seq(seq).depth as usize].dead_ends += 1;
    }
    for s in &mut stats {
        s.finish();
    }
    stats
}
