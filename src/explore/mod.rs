//! Resumable, level-synchronous breadth-first exploration.
//!
//! The builder expands every non-terminal position of depth `d - 1` to produce depth `d`,
//! recording each new identity once (transpositions collapse onto the first arrival) and
//! every one-ply edge into the new level. A checkpoint is written when a depth completes,
//! and additionally inside a depth whenever the [`CheckpointPolicy`] fires, so a long depth
//! never risks more than one checkpoint interval of work.
//!
//! Resume is driven by the stored [`ProgressMarker`]: the frontier is the stored level
//! `last_completed_depth`, and `frontier_cursor` entries of it are skipped because their
//! expansion is already on disk. Re-expanding a partially saved entry is harmless: its
//! children already exist and edges are deduplicated.

pub mod cancel;
pub mod config;
pub mod context;
pub mod filter;
pub mod resources;

use chrono::Utc;
use log::{debug, info, warn};

use crate::error::SearchError;
use crate::oracle::RuleOracle;
use crate::position::{Position, PositionKey, PositionSet};
use crate::store::{CheckpointStore, ProgressMarker};

pub use cancel::CancelToken;
pub use config::{CheckpointPolicy, ExploreConfig, ExploreLimits};
pub use context::{
    CheckpointReason, ExplorationContext, ExploreEvent, ExploreObserver, ExploreStats,
};
pub use filter::{AcceptAll, FilterFn, MoveFilter};
use resources::{ResourceCounts, ResourceTracker};

enum Prepared {
    Complete(PositionSet),
    Resume(PositionSet, ProgressMarker),
    Fresh,
}

/// One exploration run: an oracle, a store, and the run's configuration.
pub struct TreeBuilder<'a, O, S, F = AcceptAll> {
    oracle: &'a O,
    store: &'a mut S,
    config: ExploreConfig,
    filter: F,
    cancel: CancelToken,
    observer: Option<&'a mut dyn ExploreObserver>,
    last_stats: Option<ExploreStats>,
}

impl<'a, O, S> TreeBuilder<'a, O, S, AcceptAll>
where
    O: RuleOracle,
    S: CheckpointStore,
{
    pub fn new(oracle: &'a O, store: &'a mut S, config: ExploreConfig) -> Self {
        Self {
            oracle,
            store,
            config,
            filter: AcceptAll,
            cancel: CancelToken::new(),
            observer: None,
            last_stats: None,
        }
    }
}

impl<'a, O, S, F> TreeBuilder<'a, O, S, F>
where
    O: RuleOracle,
    S: CheckpointStore,
    F: MoveFilter<O::Move>,
{
    pub fn with_filter<G: MoveFilter<O::Move>>(self, filter: G) -> TreeBuilder<'a, O, S, G> {
        TreeBuilder {
            oracle: self.oracle,
            store: self.store,
            config: self.config,
            filter,
            cancel: self.cancel,
            observer: self.observer,
            last_stats: self.last_stats,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_observer(mut self, observer: &'a mut dyn ExploreObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Counters as of the end of the last `explore` call that did any work.
    pub fn last_stats(&self) -> Option<ExploreStats> {
        self.last_stats
    }

    /// Explore from `root` to the configured target depth.
    pub fn explore(&mut self, root: &O::State) -> Result<PositionSet, SearchError> {
        let target = self.config.target_depth;
        let root_key = self.oracle.identity(root);

        let (mut set, marker) = match self.prepare(&root_key)? {
            Prepared::Complete(set) => return Ok(set),
            Prepared::Resume(set, marker) => (set, marker),
            Prepared::Fresh => self.seed(root, &root_key)?,
        };

        let mut ctx = ExplorationContext::new(marker.moves_examined);
        let mut tracker = ResourceTracker::new(
            self.config.limits,
            ResourceCounts {
                positions: set.len() as u64,
                moves: marker.moves_examined,
            },
        );
        let mut cursor = marker.frontier_cursor as usize;
        let mut depth = marker.last_completed_depth + 1;

        while depth <= target {
            let frontier: Vec<usize> = set
                .level(depth - 1)
                .filter(|&seq| !set.by_seq(seq).is_terminal())
                .collect();

            if frontier.is_empty() {
                info!(
                    "depth {}: no non-terminal positions, exploration exhausted",
                    depth - 1
                );
                let done = self.marker(&root_key, target, ctx.moves_examined(), 0);
                self.commit(&mut set, &done, CheckpointReason::DepthCompleted, &mut ctx)?;
                break;
            }

            info!(
                "depth {depth}: expanding {} frontier positions{}",
                frontier.len(),
                if cursor > 0 {
                    format!(" (skipping {cursor} already expanded)")
                } else {
                    String::new()
                }
            );

            for (i, &parent) in frontier.iter().enumerate().skip(cursor) {
                let step =
                    self.expand(&mut set, &mut ctx, &mut tracker, parent, depth, &root_key, i);
                if let Err(err) = step {
                    let reason = match err {
                        SearchError::Cancelled { .. } => Some(CheckpointReason::Cancelled),
                        SearchError::LimitExceeded { .. } => Some(CheckpointReason::LimitExceeded),
                        _ => None,
                    };
                    if let Some(reason) = reason {
                        let partial =
                            self.marker(&root_key, depth - 1, ctx.moves_at_cursor(), i as u64);
                        self.commit(&mut set, &partial, reason, &mut ctx)?;
                    }
                    self.last_stats = Some(ctx.stats(set.len()));
                    return Err(err);
                }
                ctx.note_parent_done();
            }
            cursor = 0;

            let complete = self.marker(&root_key, depth, ctx.moves_examined(), 0);
            self.commit(&mut set, &complete, CheckpointReason::DepthCompleted, &mut ctx)?;

            let positions_at_depth = set.level(depth).len();
            let stats = ctx.stats(set.len());
            info!(
                "depth {depth} complete: {positions_at_depth} new positions, {} total, {} moves examined, {:.1?} elapsed",
                stats.positions, stats.moves_examined, stats.elapsed
            );
            self.emit(ExploreEvent::DepthCompleted {
                depth,
                positions_at_depth,
                stats,
            });
            depth += 1;
        }

        self.last_stats = Some(ctx.stats(set.len()));
        Ok(set)
    }

    fn prepare(&mut self, root_key: &PositionKey) -> Result<Prepared, SearchError> {
        if self.config.resume {
            match self.store.load_progress()? {
                Some(m) if &m.root == root_key => {
                    let (mut set, stored) = self.store.load_all()?;
                    let marker = stored.unwrap_or(m);
                    if set.is_empty() {
                        warn!("progress marker has no stored positions; starting fresh");
                    } else if marker.last_completed_depth >= self.config.target_depth {
                        info!(
                            "stored exploration already complete to depth {} (target {})",
                            marker.last_completed_depth, self.config.target_depth
                        );
                        // A level saved mid-depth above the marker is not part of the result.
                        set.truncate_to_depth(marker.last_completed_depth);
                        return Ok(Prepared::Complete(set));
                    } else {
                        info!(
                            "resuming after depth {} with {} stored positions",
                            marker.last_completed_depth,
                            set.len()
                        );
                        return Ok(Prepared::Resume(set, marker));
                    }
                }
                Some(m) => warn!(
                    "stored root {} differs from requested root {root_key}; discarding stored exploration",
                    m.root
                ),
                None => debug!("no stored progress; starting fresh"),
            }
        }
        self.store.reset()?;
        Ok(Prepared::Fresh)
    }

    fn seed(
        &mut self,
        root: &O::State,
        root_key: &PositionKey,
    ) -> Result<(PositionSet, ProgressMarker), SearchError> {
        let outcome = self.oracle.classify(root)?;
        let mut set = PositionSet::new();
        set.insert(Position {
            key: root_key.clone(),
            depth: 0,
            moves: Vec::new(),
            outcome,
            snapshot: self.oracle.snapshot(root),
        });
        let marker = self.marker(root_key, 0, 0, 0);
        self.store.checkpoint(&mut set, &marker)?;
        debug!("seeded exploration at root {root_key} ({outcome:?})");
        Ok((set, marker))
    }

    #[allow(clippy::too_many_arguments)]
    fn expand(
        &mut self,
        set: &mut PositionSet,
        ctx: &mut ExplorationContext,
        tracker: &mut ResourceTracker,
        parent_seq: usize,
        depth: u32,
        root_key: &PositionKey,
        cursor: usize,
    ) -> Result<(), SearchError> {
        let parent = set.by_seq(parent_seq).clone();
        let state = self.oracle.restore(&parent.snapshot)?;
        let moves = self.oracle.legal_moves(&state)?;

        for mv in &moves {
            if self.cancel.is_cancelled() {
                return Err(SearchError::Cancelled {
                    last_completed_depth: depth - 1,
                });
            }
            ctx.note_move();
            tracker.bump_moves("expand", 1)?;

            if self.filter.accept(&parent, mv) {
                let child = self.oracle.apply_move(&state, mv)?;
                let key = self.oracle.identity(&child);
                match set.seq_of(&key) {
                    Some(existing) => {
                        // Shallower arrivals get no edge: edges only span one ply.
                        if set.by_seq(existing).depth == depth {
                            set.add_edge(parent_seq, existing);
                        }
                    }
                    None => {
                        tracker.bump_positions("expand", 1)?;
                        let outcome = self.oracle.classify(&child)?;
                        let mut arrival = Vec::with_capacity(parent.moves.len() + 1);
                        arrival.extend_from_slice(&parent.moves);
                        arrival.push(self.oracle.notation(mv));
                        set.try_reserve(1)
                            .map_err(|_| SearchError::AllocationFailed {
                                stage: "expand",
                                structure: "position_set",
                            })?;
                        let position = Position {
                            key,
                            depth,
                            moves: arrival,
                            outcome,
                            snapshot: self.oracle.snapshot(&child),
                        };
                        if let Some(seq) = set.insert(position) {
                            set.add_edge(parent_seq, seq);
                        }
                    }
                }
            }

            if ctx.progress_due(self.config.progress_every) {
                let stats = ctx.stats(set.len());
                info!(
                    "  examined {} moves, {} unique positions, {:.1?} elapsed",
                    stats.moves_examined, stats.positions, stats.elapsed
                );
                self.emit(ExploreEvent::Progress(stats));
            }

            if let Some(reason) = ctx.checkpoint_due(&self.config.checkpoint) {
                let partial =
                    self.marker(root_key, depth - 1, ctx.moves_at_cursor(), cursor as u64);
                self.commit(set, &partial, reason, ctx)?;
            }
        }
        Ok(())
    }

    fn commit(
        &mut self,
        set: &mut PositionSet,
        marker: &ProgressMarker,
        reason: CheckpointReason,
        ctx: &mut ExplorationContext,
    ) -> Result<(), SearchError> {
        self.store.checkpoint(set, marker)?;
        ctx.note_checkpoint();
        debug!(
            "checkpoint ({reason:?}): last completed depth {}, cursor {}, {} positions",
            marker.last_completed_depth,
            marker.frontier_cursor,
            set.len()
        );
        self.emit(ExploreEvent::Checkpointed {
            reason,
            last_completed_depth: marker.last_completed_depth,
            frontier_cursor: marker.frontier_cursor,
            stats: ctx.stats(set.len()),
        });
        Ok(())
    }

    fn marker(
        &self,
        root: &PositionKey,
        last_completed_depth: u32,
        moves_examined: u64,
        frontier_cursor: u64,
    ) -> ProgressMarker {
        ProgressMarker {
            root: root.clone(),
            last_completed_depth,
            target_depth: self.config.target_depth,
            moves_examined,
            frontier_cursor,
            timestamp: Utc::now(),
        }
    }

    fn emit(&mut self, event: ExploreEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }
}

/// Explore with default checkpointing and no filter.
pub fn explore<O, S>(
    oracle: &O,
    store: &mut S,
    root: &O::State,
    target_depth: u32,
    resume: bool,
) -> Result<PositionSet, SearchError>
where
    O: RuleOracle,
    S: CheckpointStore,
{
    let config = ExploreConfig::new(target_depth).with_resume(resume);
    TreeBuilder::new(oracle, store, config).explore(root)
}
