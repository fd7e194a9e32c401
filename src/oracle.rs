//! The rule-engine capability consumed by the tree builder and the analyzer.
//!
//! Nothing in this crate knows how a game is played: legal moves, move application and
//! terminal classification all come from a [`RuleOracle`]. Errors are deterministic rule
//! violations and are never retried.

use thiserror::Error;

use crate::position::PositionKey;

/// Terminal classification of a state, from the point of view of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ongoing,
    /// The side to move has no continuation and has lost.
    LossForMover,
    Draw,
}

impl Outcome {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("malformed state: {reason}")]
    MalformedState { reason: String },
    #[error("illegal move {notation} in {state}")]
    IllegalMove { notation: String, state: String },
    #[error("cannot restore snapshot {snapshot:?}: {reason}")]
    BadSnapshot { snapshot: String, reason: String },
}

/// Game rules, as seen by the search.
///
/// `identity` must be canonical: two states reached by different move orders that are the
/// same game state must produce the same key. `snapshot`/`restore` round-trip the full state
/// so that a persisted frontier can be expanded again after a restart.
pub trait RuleOracle {
    type State: Clone;
    type Move: Clone;

    fn legal_moves(&self, state: &Self::State) -> Result<Vec<Self::Move>, OracleError>;

    fn apply_move(&self, state: &Self::State, mv: &Self::Move) -> Result<Self::State, OracleError>;

    fn classify(&self, state: &Self::State) -> Result<Outcome, OracleError>;

    fn identity(&self, state: &Self::State) -> PositionKey;

    /// Stable textual form of a move, used in persisted move sequences.
    fn notation(&self, mv: &Self::Move) -> String;

    fn snapshot(&self, state: &Self::State) -> String;

    fn restore(&self, snapshot: &str) -> Result<Self::State, OracleError>;
}
