//! Low-level, allocation-free board primitives.
//!
//! - [`coord`]: signed file/rank coordinates and the king step set.
//! - [`square`]: the 64 squares of a standard board, packed into a byte.

pub mod coord;
pub mod square;
