use crate::error::SearchError;

/// Per-position continuation counts, indexed by sequence number.
///
/// `current` starts equal to `initial` and only ever decreases, saturating at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveCounts {
    initial: Vec<u32>,
    current: Vec<u32>,
}

impl MoveCounts {
    pub fn from_initial(initial: Vec<u32>) -> Result<Self, SearchError> {
        let mut current = Vec::new();
        current
            .try_reserve_exact(initial.len())
            .map_err(|_| SearchError::AllocationFailed {
                stage: "classify",
                structure: "current_move_counts",
            })?;
        current.extend_from_slice(&initial);
        Ok(Self { initial, current })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.initial.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
    }

    #[inline]
    pub fn initial(&self, seq: usize) -> u32 {
        self.initial[seq]
    }

    #[inline]
    pub fn current(&self, seq: usize) -> u32 {
        self.current[seq]
    }

    /// Close one continuation of `seq`. Returns the new count, or `None` if it was already
    /// zero (nothing left to close).
    #[inline]
    pub fn decrement(&mut self, seq: usize) -> Option<u32> {
        let c = &mut self.current[seq];
        if *c == 0 {
            return None;
        }
        *c -= 1;
        Some(*c)
    }
}
