use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Everything a run needs besides the oracle, the store and the root.
///
/// Deserializable so binaries can read it from a JSON file; missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExploreConfig {
    pub target_depth: u32,
    /// Continue from the stored checkpoint when its root matches.
    pub resume: bool,
    pub checkpoint: CheckpointPolicy,
    /// Log a progress line every this many examined moves (0 disables).
    pub progress_every: u64,
    pub limits: ExploreLimits,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            target_depth: 6,
            resume: true,
            checkpoint: CheckpointPolicy::default(),
            progress_every: 10_000,
            limits: ExploreLimits::default(),
        }
    }
}

impl ExploreConfig {
    pub fn new(target_depth: u32) -> Self {
        Self {
            target_depth,
            ..Self::default()
        }
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: CheckpointPolicy) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub fn with_limits(mut self, limits: ExploreLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// When to write a checkpoint in the middle of a depth.
///
/// The end-of-depth checkpoint is unconditional; these only bound how much work inside a
/// long depth can be lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointPolicy {
    pub every_moves: Option<u64>,
    pub every_interval_secs: Option<u64>,
}

impl Default for CheckpointPolicy {
    fn default() -> Self {
        Self {
            every_moves: Some(250_000),
            every_interval_secs: Some(600),
        }
    }
}

impl CheckpointPolicy {
    /// Checkpoint only when a depth completes.
    pub fn per_depth_only() -> Self {
        Self {
            every_moves: None,
            every_interval_secs: None,
        }
    }

    pub fn every_moves(moves: u64) -> Self {
        Self {
            every_moves: Some(moves),
            every_interval_secs: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.every_interval_secs.map(Duration::from_secs)
    }
}

/// Budgets bounding memory and work. Exceeding one checkpoints the partial work and fails
/// the run with [`crate::error::SearchError::LimitExceeded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExploreLimits {
    pub max_positions: usize,
    pub max_moves: u64,
}

impl Default for ExploreLimits {
    fn default() -> Self {
        Self {
            max_positions: usize::MAX,
            max_moves: u64::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_takes_defaults() {
        let cfg: ExploreConfig =
            serde_json::from_str(r#"{"target_depth": 3, "checkpoint": {"every_moves": 5}}"#)
                .unwrap();
        assert_eq!(cfg.target_depth, 3);
        assert!(cfg.resume);
        assert_eq!(cfg.checkpoint.every_moves, Some(5));
        assert_eq!(cfg.checkpoint.every_interval_secs, Some(600));
        assert_eq!(cfg.limits, ExploreLimits::default());
    }
}
