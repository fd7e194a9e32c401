//! Resumable breadth-first exploration of a game tree behind a rule oracle, with checkpointed
//! storage and a retrograde "barrier" analysis of the explored tree.
//!
//! The search itself is game-agnostic: it talks to a [`oracle::RuleOracle`]. A reference
//! oracle for lone-king chess endgames lives in [`chess`].

pub mod core;
pub mod chess;
pub mod oracle;
pub mod position;
pub mod store;
pub mod explore;
pub mod retro;
pub mod worker;
pub mod error;

pub use error::SearchError;
pub use explore::{explore, ExploreConfig, TreeBuilder};
pub use oracle::{OracleError, Outcome, RuleOracle};
pub use position::{Position, PositionKey, PositionSet};
pub use retro::{analyze, Analysis};
pub use store::{CheckpointStore, MemoryStore, ProgressMarker, SqliteStore, StoreError};
