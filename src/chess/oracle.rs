use crate::chess::board::Board;
use crate::chess::fen;
use crate::chess::rules::{self, ChessMove};
use crate::oracle::{OracleError, Outcome, RuleOracle};
use crate::position::PositionKey;

/// Rule oracle for a white king plus Q/R/B/N against a lone black king.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndgameOracle;

impl EndgameOracle {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_fen(&self, text: &str) -> Result<Board, OracleError> {
        fen::parse(text)
    }
}

impl RuleOracle for EndgameOracle {
    type State = Board;
    type Move = ChessMove;

    fn legal_moves(&self, state: &Board) -> Result<Vec<ChessMove>, OracleError> {
        Ok(rules::legal_moves(state))
    }

    fn apply_move(&self, state: &Board, mv: &ChessMove) -> Result<Board, OracleError> {
        rules::apply(state, *mv)
    }

    fn classify(&self, state: &Board) -> Result<Outcome, OracleError> {
        Ok(rules::classify(state))
    }

    fn identity(&self, state: &Board) -> PositionKey {
        PositionKey::new(fen::format(state))
    }

    fn notation(&self, mv: &ChessMove) -> String {
        mv.to_string()
    }

    fn snapshot(&self, state: &Board) -> String {
        fen::format(state)
    }

    fn restore(&self, snapshot: &str) -> Result<Board, OracleError> {
        fen::parse(snapshot).map_err(|err| OracleError::BadSnapshot {
            snapshot: snapshot.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_placement_and_side() {
        let oracle = EndgameOracle::new();
        let root = oracle.parse_fen("8/8/8/3k4/8/8/8/R3K2R w").unwrap();
        let a = oracle.apply_move(&root, &ChessMove::parse("a1a2").unwrap()).unwrap();
        let b = oracle.apply_move(&root, &ChessMove::parse("h1h2").unwrap()).unwrap();
        assert_ne!(oracle.identity(&a), oracle.identity(&b));

        let via_a = oracle.parse_fen("8/8/8/3k4/8/8/R7/4K2R b").unwrap();
        assert_eq!(oracle.identity(&a), oracle.identity(&via_a));
    }

    #[test]
    fn snapshot_restores_same_state() {
        let oracle = EndgameOracle::new();
        let state = oracle.parse_fen("4k3/8/8/8/8/8/4Q3/4K3 w - - 0 1").unwrap();
        let restored = oracle.restore(&oracle.snapshot(&state)).unwrap();
        assert_eq!(restored, state);
        assert!(matches!(
            oracle.restore("not a fen"),
            Err(OracleError::BadSnapshot { .. })
        ));
    }
}
