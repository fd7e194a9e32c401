//! Budget tracking for exploration.
//!
//! Exploration can explode combinatorially. Counter-based budgets stop a run cleanly (after a
//! checkpoint) instead of letting it die on an out-of-memory abort.

use crate::error::SearchError;
use crate::explore::config::ExploreLimits;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub positions: u64,
    pub moves: u64,
}

#[derive(Debug, Clone)]
pub struct ResourceTracker {
    limits: ExploreLimits,
    counts: ResourceCounts,
}

impl ResourceTracker {
    #[inline]
    pub fn new(limits: ExploreLimits, counts: ResourceCounts) -> Self {
        Self { limits, counts }
    }

    #[inline]
    pub fn counts(&self) -> ResourceCounts {
        self.counts
    }

    #[inline]
    pub fn bump_positions(&mut self, stage: &'static str, delta: u64) -> Result<(), SearchError> {
        let limit = self.limits.max_positions as u64;
        Self::bump(stage, "positions", &mut self.counts.positions, delta, limit)
    }

    #[inline]
    pub fn bump_moves(&mut self, stage: &'static str, delta: u64) -> Result<(), SearchError> {
        let limit = self.limits.max_moves;
        Self::bump(stage, "moves", &mut self.counts.moves, delta, limit)
    }

    fn bump(
        stage: &'static str,
        metric: &'static str,
        value: &mut u64,
        delta: u64,
        limit: u64,
    ) -> Result<(), SearchError> {
        *value = value.saturating_add(delta);
        if *value > limit {
            return Err(SearchError::LimitExceeded {
                stage,
                metric,
                limit,
                observed: *value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_inclusive() {
        let limits = ExploreLimits {
            max_positions: 2,
            max_moves: u64::MAX,
        };
        let mut t = ResourceTracker::new(limits, ResourceCounts::default());
        t.bump_positions("test", 2).unwrap();
        t.bump_moves("test", 7).unwrap();
        let err = t.bump_positions("test", 1).unwrap_err();
        assert!(matches!(
            err,
            SearchError::LimitExceeded {
                metric: "positions",
                limit: 2,
                observed: 3,
                ..
            }
        ));
        assert_eq!(
            t.counts(),
            ResourceCounts {
                positions: 3,
                moves: 7
            }
        );
    }
}
