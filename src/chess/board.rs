use crate::chess::piece::{Color, PieceKind};
use crate::chess::rules;
use crate::core::square::Square;
use crate::oracle::OracleError;

/// White king plus material against a lone black king.
///
/// `pieces` is kept sorted by square, so two boards with the same placement compare equal
/// regardless of how they were reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    white_king: Square,
    black_king: Square,
    pieces: Vec<(Square, PieceKind)>,
    to_move: Color,
}

impl Board {
    /// Build a board, rejecting placements that cannot arise in play:
    /// - two units on one square
    /// - touching kings
    /// - the side not to move in check
    pub fn new(
        white_king: Square,
        black_king: Square,
        mut pieces: Vec<(Square, PieceKind)>,
        to_move: Color,
    ) -> Result<Self, OracleError> {
        pieces.sort_unstable();
        let malformed = |reason: &str| OracleError::MalformedState {
            reason: reason.to_string(),
        };

        if white_king == black_king {
            return Err(malformed("kings share a square"));
        }
        if white_king.coord().touches(black_king.coord()) {
            return Err(malformed("kings are adjacent"));
        }
        if pieces.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(malformed("two pieces share a square"));
        }
        if pieces
            .iter()
            .any(|&(sq, _)| sq == white_king || sq == black_king)
        {
            return Err(malformed("piece on a king square"));
        }

        let board = Self {
            white_king,
            black_king,
            pieces,
            to_move,
        };
        if to_move == Color::White && rules::black_in_check(&board) {
            return Err(malformed("black king in check with white to move"));
        }
        Ok(board)
    }

    #[inline]
    pub fn white_king(&self) -> Square {
        self.white_king
    }

    #[inline]
    pub fn black_king(&self) -> Square {
        self.black_king
    }

    #[inline]
    pub fn pieces(&self) -> &[(Square, PieceKind)] {
        &self.pieces
    }

    #[inline]
    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn piece_at(&self, sq: Square) -> Option<PieceKind> {
        self.pieces
            .binary_search_by_key(&sq, |&(s, _)| s)
            .ok()
            .map(|i| self.pieces[i].1)
    }

    /// Bitmask of occupied squares (both kings included).
    pub fn occupancy(&self) -> u64 {
        self.pieces
            .iter()
            .fold(bit(self.white_king) | bit(self.black_king), |acc, &(sq, _)| {
                acc | bit(sq)
            })
    }

    /// Neither side can ever mate: bare kings, or one minor piece.
    pub fn is_insufficient_material(&self) -> bool {
        match self.pieces.as_slice() {
            [] => true,
            [(_, kind)] => kind.is_minor(),
            _ => false,
        }
    }

    /// Same placement with `from`'s occupant moved to `to`, capturing whatever stood there,
    /// and the other side to move. No legality checks.
    pub(crate) fn with_move(&self, from: Square, to: Square) -> Board {
        let mut next = self.clone();
        next.to_move = self.to_move.opponent();
        match self.to_move {
            Color::Black => {
                next.black_king = to;
                next.pieces.retain(|&(sq, _)| sq != to);
            }
            Color::White if from == self.white_king => next.white_king = to,
            Color::White => {
                for entry in next.pieces.iter_mut() {
                    if entry.0 == from {
                        entry.0 = to;
                    }
                }
                next.pieces.sort_unstable();
            }
        }
        next
    }
}

#[inline]
pub(crate) fn bit(sq: Square) -> u64 {
    1u64 << sq.index()
}
