use thiserror::Error;

use crate::oracle::OracleError;
use crate::store::StoreError;

/// Structured errors returned by exploration and analysis.
///
/// Oracle and store failures are fatal to the run; the last committed checkpoint is what a
/// later resume starts from.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("rule oracle: {0}")]
    Oracle(#[from] OracleError),
    #[error("checkpoint store: {0}")]
    Store(#[from] StoreError),
    /// A configured resource limit was exceeded.
    #[error("limit exceeded at {stage}: {metric} (limit={limit}, observed={observed})")]
    LimitExceeded {
        stage: &'static str,
        metric: &'static str,
        limit: u64,
        observed: u64,
    },
    /// A `try_reserve` allocation failed for a large structure.
    #[error("allocation failed at {stage} for {structure}")]
    AllocationFailed {
        stage: &'static str,
        structure: &'static str,
    },
    #[error("exploration cancelled; depth {last_completed_depth} is the last completed depth")]
    Cancelled { last_completed_depth: u32 },
}
