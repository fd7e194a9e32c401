//! Durable checkpoints for resumable exploration.
//!
//! A checkpoint is one logical unit: the positions and edges recorded since the previous
//! checkpoint, plus a new [`ProgressMarker`]. Writes are idempotent on identity, so replaying
//! a batch after a crash is harmless.

pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::position::{Position, PositionKey, PositionSet};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("io error at {stage} for {path}: {error}")]
    Io {
        stage: &'static str,
        path: String,
        error: std::io::Error,
    },
    #[error("corrupt checkpoint: {reason}")]
    Corrupt { reason: String },
    /// Injected by [`MemoryStore::fail_next_write`].
    #[error("injected write failure")]
    Injected,
}

/// The single "where are we" record. The most recently written marker wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMarker {
    pub root: PositionKey,
    pub last_completed_depth: u32,
    pub target_depth: u32,
    /// Cumulative across resumes.
    pub moves_examined: u64,
    /// Frontier entries of depth `last_completed_depth + 1` already fully expanded. Zero at
    /// depth boundaries; non-zero only for mid-depth checkpoints.
    pub frontier_cursor: u64,
    pub timestamp: DateTime<Utc>,
}

/// Positions and edges to persist in one checkpoint.
///
/// `first_seq` / `first_edge_seq` are the sequence numbers of the first position / edge in
/// the batch, so the store can reproduce insertion order on load.
#[derive(Debug, Clone, Copy)]
pub struct CheckpointBatch<'a> {
    pub positions: &'a [Position],
    pub first_seq: usize,
    pub edges: &'a [(&'a PositionKey, &'a PositionKey)],
    pub first_edge_seq: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub positions: u64,
    pub edges: u64,
    pub latest: Option<ProgressMarker>,
}

pub trait CheckpointStore {
    /// Durably write a batch and a marker as one unit.
    fn upsert_batch(
        &mut self,
        batch: CheckpointBatch<'_>,
        marker: &ProgressMarker,
    ) -> Result<(), StoreError>;

    /// Materialize every stored position, in insertion order, with its edges.
    fn load_all(&self) -> Result<(PositionSet, Option<ProgressMarker>), StoreError>;

    /// Latest marker only; does not touch the positions table.
    fn load_progress(&self) -> Result<Option<ProgressMarker>, StoreError>;

    fn reset(&mut self) -> Result<(), StoreError>;

    fn stats(&self) -> Result<StoreStats, StoreError>;

    /// Persist whatever `set` recorded since its last commit, then mark it committed.
    fn checkpoint(
        &mut self,
        set: &mut PositionSet,
        marker: &ProgressMarker,
    ) -> Result<(), StoreError> {
        {
            let first_seq = set.len() - set.pending_positions().len();
            let edges: Vec<(&PositionKey, &PositionKey)> = set.pending_edges().collect();
            let first_edge_seq = set.edge_count() - edges.len();
            let batch = CheckpointBatch {
                positions: set.pending_positions(),
                first_seq,
                edges: &edges,
                first_edge_seq,
            };
            self.upsert_batch(batch, marker)?;
        }
        set.mark_committed();
        Ok(())
    }
}

impl<S: CheckpointStore + ?Sized> CheckpointStore for Box<S> {
    fn upsert_batch(
        &mut self,
        batch: CheckpointBatch<'_>,
        marker: &ProgressMarker,
    ) -> Result<(), StoreError> {
        (**self).upsert_batch(batch, marker)
    }

    fn load_all(&self) -> Result<(PositionSet, Option<ProgressMarker>), StoreError> {
        (**self).load_all()
    }

    fn load_progress(&self) -> Result<Option<ProgressMarker>, StoreError> {
        (**self).load_progress()
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        (**self).reset()
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        (**self).stats()
    }
}

/// Rebuild a set from rows already sorted by sequence number.
pub(crate) fn assemble(
    positions: Vec<Position>,
    edges: Vec<(PositionKey, PositionKey)>,
) -> Result<PositionSet, StoreError> {
    let mut set = PositionSet::new();
    set.try_reserve(positions.len())
        .map_err(|_| StoreError::Corrupt {
            reason: format!("cannot allocate {} positions", positions.len()),
        })?;

    let mut last_depth = 0;
    for p in positions {
        if p.depth < last_depth {
            return Err(StoreError::Corrupt {
                reason: format!("position {} breaks depth order", p.key),
            });
        }
        last_depth = p.depth;
        let key = p.key.clone();
        if set.insert(p).is_none() {
            return Err(StoreError::Corrupt {
                reason: format!("duplicate position {key}"),
            });
        }
    }

    for (parent, child) in edges {
        let (Some(p), Some(c)) = (set.seq_of(&parent), set.seq_of(&child)) else {
            return Err(StoreError::Corrupt {
                reason: format!("edge {parent} -> {child} references a missing position"),
            });
        };
        if set.by_seq(p).depth + 1 != set.by_seq(c).depth {
            return Err(StoreError::Corrupt {
                reason: format!("edge {parent} -> {child} does not span exactly one ply"),
            });
        }
        set.add_edge(p, c);
    }

    set.mark_committed();
    Ok(set)
}
