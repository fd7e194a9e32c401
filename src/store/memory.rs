//! Volatile checkpoint store for tests and disk-less runs.

use rustc_hash::FxHashSet;

use crate::position::{Position, PositionKey, PositionSet};
use crate::store::{
    assemble, CheckpointBatch, CheckpointStore, ProgressMarker, StoreError, StoreStats,
};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    positions: Vec<(usize, Position)>,
    keys: FxHashSet<PositionKey>,
    edges: Vec<(usize, PositionKey, PositionKey)>,
    edge_keys: FxHashSet<(PositionKey, PositionKey)>,
    markers: Vec<ProgressMarker>,
    fail_next_write: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `upsert_batch` fail without writing anything.
    pub fn fail_next_write(&mut self) {
        self.fail_next_write = true;
    }

    /// Number of successful batches.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Every marker written so far, oldest first.
    pub fn markers(&self) -> &[ProgressMarker] {
        &self.markers
    }
}

impl CheckpointStore for MemoryStore {
    fn upsert_batch(
        &mut self,
        batch: CheckpointBatch<'_>,
        marker: &ProgressMarker,
    ) -> Result<(), StoreError> {
        if std::mem::take(&mut self.fail_next_write) {
            return Err(StoreError::Injected);
        }

        for (i, p) in batch.positions.iter().enumerate() {
            if self.keys.insert(p.key.clone()) {
                self.positions.push((batch.first_seq + i, p.clone()));
            }
        }
        for (i, (parent, child)) in batch.edges.iter().enumerate() {
            let pair = ((*parent).clone(), (*child).clone());
            if self.edge_keys.insert(pair.clone()) {
                self.edges.push((batch.first_edge_seq + i, pair.0, pair.1));
            }
        }
        self.markers.push(marker.clone());
        self.writes += 1;
        Ok(())
    }

    fn load_all(&self) -> Result<(PositionSet, Option<ProgressMarker>), StoreError> {
        let mut positions = self.positions.clone();
        positions.sort_by_key(|(seq, _)| *seq);
        let mut edges = self.edges.clone();
        edges.sort_by_key(|(seq, _, _)| *seq);

        let set = assemble(
            positions.into_iter().map(|(_, p)| p).collect(),
            edges.into_iter().map(|(_, p, c)| (p, c)).collect(),
        )?;
        Ok((set, self.load_progress()?))
    }

    fn load_progress(&self) -> Result<Option<ProgressMarker>, StoreError> {
        Ok(self.markers.last().cloned())
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        // Counters and the pending fault survive a reset.
        let writes = self.writes;
        let fail_next_write = self.fail_next_write;
        *self = Self::default();
        self.writes = writes;
        self.fail_next_write = fail_next_write;
        Ok(())
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(StoreStats {
            positions: self.positions.len() as u64,
            edges: self.edges.len() as u64,
            latest: self.load_progress()?,
        })
    }
}
