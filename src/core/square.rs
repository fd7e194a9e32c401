use std::fmt;

use crate::core::coord::Coord;

/// One of the 64 board squares, packed as `rank * 8 + file`.
///
/// Ordering follows the packed index (a1 < b1 < ... < h8), which is what canonical piece
/// lists sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn from_coord(c: Coord) -> Option<Square> {
        if c.on_board() {
            Some(Square((c.y * 8 + c.x) as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn coord(self) -> Coord {
        Coord::new((self.0 % 8) as i32, (self.0 / 8) as i32)
    }

    /// Step by `delta`, or `None` when that leaves the board.
    pub fn offset(self, delta: Coord) -> Option<Square> {
        Square::from_coord(self.coord() + delta)
    }

    /// Parse algebraic notation (`e4`).
    pub fn parse(s: &str) -> Option<Square> {
        let b = s.as_bytes();
        if b.len() != 2 {
            return None;
        }
        let file = b[0].wrapping_sub(b'a') as i32;
        let rank = b[1].wrapping_sub(b'1') as i32;
        Square::from_coord(Coord::new(file, rank))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.coord();
        write!(f, "{}{}", (b'a' + c.x as u8) as char, c.y + 1)
    }
}
