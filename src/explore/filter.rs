use crate::position::Position;

/// Pure accept/reject predicate evaluated before a move is expanded.
///
/// Rejected moves are pruned entirely: their subtrees are never explored, so terminal
/// classification below a pruned branch is unknown, not "safe".
pub trait MoveFilter<M> {
    #[inline]
    fn accept(&self, _from: &Position, _mv: &M) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<M> MoveFilter<M> for AcceptAll {}

/// Adapter so a plain closure can be used as a filter.
#[derive(Debug, Clone, Copy)]
pub struct FilterFn<F>(pub F);

impl<M, F> MoveFilter<M> for FilterFn<F>
where
    F: Fn(&Position, &M) -> bool,
{
    #[inline]
    fn accept(&self, from: &Position, mv: &M) -> bool {
        (self.0)(from, mv)
    }
}
