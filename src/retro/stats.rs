use std::fmt;

use serde::{Deserialize, Serialize};

/// An exact ratio, or `Undefined` when the denominator is zero.
///
/// Kept as integers so comparisons and serialization are unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ratio {
    Defined { numerator: u64, denominator: u64 },
    Undefined,
}

impl Ratio {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            Ratio::Undefined
        } else {
            Ratio::Defined {
                numerator,
                denominator,
            }
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Defined {
                numerator,
                denominator,
            } => Some(numerator as f64 / denominator as f64),
            Ratio::Undefined => None,
        }
    }

    pub fn verdict(self) -> BarrierVerdict {
        match self {
            Ratio::Undefined => BarrierVerdict::Undefined,
            Ratio::Defined {
                numerator,
                denominator,
            } if numerator <= denominator => BarrierVerdict::Closing,
            Ratio::Defined { .. } => BarrierVerdict::Open,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{v:.2}"),
            None => f.write_str("undefined"),
        }
    }
}

/// Reading of a ratio. Descriptive only; not a proof of a forced result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierVerdict {
    /// No barrier at this depth.
    Undefined,
    /// Ratio <= 1: the barrier is at least as large as the remaining branching.
    Closing,
    /// Ratio > 1: more options than barriers.
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthStats {
    pub depth: u32,
    pub positions: u64,
    pub terminal_losses: u64,
    pub dead_ends: u64,
    /// Sum of initial continuation counts.
    pub initial_moves: u64,
    /// Sum of current ("safe") continuation counts after propagation.
    pub current_moves: u64,
    pub barrier_ratio: Ratio,
    pub refined_ratio: Ratio,
}

impl DepthStats {
    pub(crate) fn empty(depth: u32) -> Self {
        Self {
            depth,
            positions: 0,
            terminal_losses: 0,
            dead_ends: 0,
            initial_moves: 0,
            current_moves: 0,
            barrier_ratio: Ratio::Undefined,
            refined_ratio: Ratio::Undefined,
        }
    }

    #[inline]
    pub fn barrier(&self) -> u64 {
        self.terminal_losses + self.dead_ends
    }

    pub(crate) fn finish(&mut self) {
        self.barrier_ratio = Ratio::new(self.initial_moves, self.barrier());
        self.refined_ratio = Ratio::new(self.current_moves, self.barrier());
    }
}
