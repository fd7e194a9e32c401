//! Per-run exploration state: counters, checkpoint timers, and progress events.

use std::time::{Duration, Instant};

use crate::explore::config::CheckpointPolicy;

/// Immutable snapshot of a run's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExploreStats {
    /// Cumulative across resumes.
    pub moves_examined: u64,
    pub positions: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointReason {
    /// The mandatory save when a depth completes.
    DepthCompleted,
    MoveThreshold,
    Interval,
    Cancelled,
    LimitExceeded,
}

/// Notifications emitted while exploring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreEvent {
    Progress(ExploreStats),
    DepthCompleted {
        depth: u32,
        positions_at_depth: usize,
        stats: ExploreStats,
    },
    Checkpointed {
        reason: CheckpointReason,
        last_completed_depth: u32,
        frontier_cursor: u64,
        stats: ExploreStats,
    },
}

pub trait ExploreObserver {
    fn on_event(&mut self, _event: &ExploreEvent) {}
}

/// Counters owned by one builder for one run; nothing here is shared between runs.
#[derive(Debug, Clone)]
pub struct ExplorationContext {
    started: Instant,
    moves_examined: u64,
    /// `moves_examined` as of the last fully expanded frontier entry.
    moves_at_cursor: u64,
    last_checkpoint_at: Instant,
    last_checkpoint_moves: u64,
    last_progress_moves: u64,
}

impl ExplorationContext {
    pub fn new(moves_examined: u64) -> Self {
        let now = Instant::now();
        Self {
            started: now,
            moves_examined,
            moves_at_cursor: moves_examined,
            last_checkpoint_at: now,
            last_checkpoint_moves: moves_examined,
            last_progress_moves: moves_examined,
        }
    }

    #[inline]
    pub fn moves_examined(&self) -> u64 {
        self.moves_examined
    }

    #[inline]
    pub fn moves_at_cursor(&self) -> u64 {
        self.moves_at_cursor
    }

    #[inline]
    pub fn note_move(&mut self) {
        self.moves_examined += 1;
    }

    /// A frontier entry has been fully expanded.
    #[inline]
    pub fn note_parent_done(&mut self) {
        self.moves_at_cursor = self.moves_examined;
    }

    pub fn stats(&self, positions: usize) -> ExploreStats {
        ExploreStats {
            moves_examined: self.moves_examined,
            positions,
            elapsed: self.started.elapsed(),
        }
    }

    /// Which mid-depth trigger (if any) has fired since the last checkpoint.
    pub fn checkpoint_due(&self, policy: &CheckpointPolicy) -> Option<CheckpointReason> {
        if let Some(every) = policy.every_moves {
            if every > 0 && self.moves_examined - self.last_checkpoint_moves >= every {
                return Some(CheckpointReason::MoveThreshold);
            }
        }
        if let Some(interval) = policy.interval() {
            if self.last_checkpoint_at.elapsed() >= interval {
                return Some(CheckpointReason::Interval);
            }
        }
        None
    }

    pub fn note_checkpoint(&mut self) {
        self.last_checkpoint_at = Instant::now();
        self.last_checkpoint_moves = self.moves_examined;
    }

    /// True once every `every` moves; `every == 0` disables.
    pub fn progress_due(&mut self, every: u64) -> bool {
        if every == 0 || self.moves_examined - self.last_progress_moves < every {
            return false;
        }
        self.last_progress_moves = self.moves_examined;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_threshold_fires_and_resets() {
        let mut ctx = ExplorationContext::new(100);
        let policy = CheckpointPolicy::every_moves(3);
        for _ in 0..2 {
            ctx.note_move();
        }
        assert_eq!(ctx.checkpoint_due(&policy), None);
        ctx.note_move();
        assert_eq!(
            ctx.checkpoint_due(&policy),
            Some(CheckpointReason::MoveThreshold)
        );
        ctx.note_checkpoint();
        assert_eq!(ctx.checkpoint_due(&policy), None);
    }

    #[test]
    fn zero_interval_is_always_due() {
        let ctx = ExplorationContext::new(0);
        let policy = CheckpointPolicy {
            every_moves: None,
            every_interval_secs: Some(0),
        };
        assert_eq!(ctx.checkpoint_due(&policy), Some(CheckpointReason::Interval));
    }

    #[test]
    fn progress_every_counts_from_resume_point() {
        let mut ctx = ExplorationContext::new(5);
        assert!(!ctx.progress_due(2));
        ctx.note_move();
        ctx.note_move();
        assert!(ctx.progress_due(2));
        assert!(!ctx.progress_due(2));
        assert!(!ctx.progress_due(0));
    }
}
