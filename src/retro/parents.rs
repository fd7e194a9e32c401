use crate::error::SearchError;
use crate::position::PositionSet;

/// child -> parents, in compressed-row form.
///
/// Built in two linear passes over the recorded edges (count, then fill), never by replaying
/// move sequences. Parents of `child` are `parents[offsets[child]..offsets[child + 1]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentIndex {
    offsets: Vec<usize>,
    parents: Vec<usize>,
}

impl ParentIndex {
    pub fn build(set: &PositionSet) -> Result<Self, SearchError> {
        let n = set.len();

        let mut offsets: Vec<usize> = Vec::new();
        offsets
            .try_reserve_exact(n + 1)
            .map_err(|_| alloc_failed("parent_offsets"))?;
        offsets.resize(n + 1, 0);

        let mut edges = 0usize;
        for child in 0..n {
            let child_depth = set.by_seq(child).depth;
            let valid = set
                .parents_of(child)
                .iter()
                .filter(|&&p| set.by_seq(p).depth + 1 == child_depth)
                .count();
            edges += valid;
            offsets[child + 1] = edges;
        }

        let mut parents: Vec<usize> = Vec::new();
        parents
            .try_reserve_exact(edges)
            .map_err(|_| alloc_failed("parent_lists"))?;
        for child in 0..n {
            let child_depth = set.by_seq(child).depth;
            parents.extend(
                set.parents_of(child)
                    .iter()
                    .copied()
                    .filter(|&p| set.by_seq(p).depth + 1 == child_depth),
            );
        }
        debug_assert_eq!(parents.len(), edges);

        Ok(Self { offsets, parents })
    }

    #[inline]
    pub fn parents(&self, child: usize) -> &[usize] {
        &self.parents[self.offsets[child]..self.offsets[child + 1]]
    }

    pub fn edge_count(&self) -> usize {
        self.parents.len()
    }
}

fn alloc_failed(structure: &'static str) -> SearchError {
    SearchError::AllocationFailed {
        stage: "parent_index",
        structure,
    }
}
