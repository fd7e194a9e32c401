//! Reference rule oracle: standard-board chess endgames of white material against a lone
//! black king.

pub mod board;
pub mod fen;
pub mod oracle;
pub mod piece;
pub mod rules;

pub use board::Board;
pub use oracle::EndgameOracle;
pub use rules::ChessMove;
