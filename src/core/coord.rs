use std::ops::{Add, Mul, Sub};

/// Board coordinate: `x` is the file (0 = a), `y` is the rank (0 = rank 1).
///
/// Coordinates may leave the board while stepping; use [`Coord::on_board`] to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn chebyshev_norm(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    #[inline]
    pub fn on_board(self) -> bool {
        (0..8).contains(&self.x) && (0..8).contains(&self.y)
    }

    /// True iff the two coordinates are distinct king-neighbours.
    #[inline]
    pub fn touches(self, other: Coord) -> bool {
        (self - other).chebyshev_norm() == 1
    }
}

impl Add for Coord {
    type Output = Coord;

    #[inline]
    fn add(self, rhs: Coord) -> Self::Output {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    #[inline]
    fn sub(self, rhs: Coord) -> Self::Output {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Coord {
    type Output = Coord;

    #[inline]
    fn mul(self, rhs: i32) -> Coord {
        Coord {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// The 8 king steps around the origin.
pub const KING_STEPS: [Coord; 8] = [
    Coord { x: -1, y: -1 },
    Coord { x: -1, y: 0 },
    Coord { x: -1, y: 1 },
    Coord { x: 0, y: -1 },
    Coord { x: 0, y: 1 },
    Coord { x: 1, y: -1 },
    Coord { x: 1, y: 0 },
    Coord { x: 1, y: 1 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_edges() {
        assert!(Coord::new(0, 0).on_board());
        assert!(Coord::new(7, 7).on_board());
        assert!(!Coord::new(8, 0).on_board());
        assert!(!Coord::new(0, -1).on_board());
    }

    #[test]
    fn touching_excludes_self() {
        let c = Coord::new(3, 3);
        assert!(!c.touches(c));
        assert!(c.touches(Coord::new(4, 4)));
        assert!(!c.touches(Coord::new(5, 3)));
    }
}
