//! FEN reading and writing for lone-king endgames.
//!
//! Only the placement and side-to-move fields are meaningful here; castling, en passant and
//! the move counters are accepted on input and never written back.

use crate::chess::board::Board;
use crate::chess::piece::{Color, PieceKind};
use crate::core::coord::Coord;
use crate::core::square::Square;
use crate::oracle::OracleError;

pub fn parse(fen: &str) -> Result<Board, OracleError> {
    let malformed = |reason: String| OracleError::MalformedState { reason };

    let mut fields = fen.split_whitespace();
    let placement = fields
        .next()
        .ok_or_else(|| malformed("empty FEN".to_string()))?;
    let to_move = match fields.next() {
        None | Some("w") => Color::White,
        Some("b") => Color::Black,
        Some(other) => return Err(malformed(format!("bad side to move {other:?}"))),
    };

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(malformed(format!("expected 8 ranks, found {}", ranks.len())));
    }

    let mut white_king = None;
    let mut black_king = None;
    let mut pieces = Vec::new();

    for (row, rank_text) in ranks.iter().enumerate() {
        let y = 7 - row as i32;
        let mut x = 0i32;
        for c in rank_text.chars() {
            if let Some(run) = c.to_digit(10) {
                x += run as i32;
                continue;
            }
            let sq = Square::from_coord(Coord::new(x, y))
                .ok_or_else(|| malformed(format!("rank {} overflows", y + 1)))?;
            match c {
                'K' if white_king.is_none() => white_king = Some(sq),
                'k' if black_king.is_none() => black_king = Some(sq),
                'K' | 'k' => return Err(malformed(format!("second king '{c}'"))),
                _ => {
                    let kind = PieceKind::from_fen_char(c).ok_or_else(|| {
                        malformed(format!(
                            "unsupported piece '{c}' (white pieces and a lone black king only)"
                        ))
                    })?;
                    pieces.push((sq, kind));
                }
            }
            x += 1;
        }
        if x != 8 {
            return Err(malformed(format!("rank {} has {x} files", y + 1)));
        }
    }

    let white_king = white_king.ok_or_else(|| malformed("no white king".to_string()))?;
    let black_king = black_king.ok_or_else(|| malformed("no black king".to_string()))?;
    Board::new(white_king, black_king, pieces, to_move)
}

/// Piece placement field, rank 8 first.
pub fn placement(board: &Board) -> String {
    let mut out = String::with_capacity(64);
    for y in (0..8).rev() {
        let mut empty = 0;
        for x in 0..8 {
            let Some(sq) = Square::from_coord(Coord::new(x, y)) else {
                continue;
            };
            let c = if sq == board.white_king() {
                Some('K')
            } else if sq == board.black_king() {
                Some('k')
            } else {
                board.piece_at(sq).map(PieceKind::fen_char)
            };
            match c {
                Some(c) => {
                    if empty > 0 {
                        out.push(char::from(b'0' + empty));
                        empty = 0;
                    }
                    out.push(c);
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push(char::from(b'0' + empty));
        }
        if y > 0 {
            out.push('/');
        }
    }
    out
}

/// Placement plus side to move: the canonical text of a board.
pub fn format(board: &Board) -> String {
    format!("{} {}", placement(board), board.to_move().fen_char())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_full_fen_and_drops_counters() {
        let board = parse("4k3/8/8/8/8/8/4Q3/4K3 w - - 0 1").unwrap();
        assert_eq!(board.white_king(), Square::parse("e1").unwrap());
        assert_eq!(board.black_king(), Square::parse("e8").unwrap());
        assert_eq!(board.pieces(), &[(Square::parse("e2").unwrap(), PieceKind::Queen)]);
        assert_eq!(format(&board), "4k3/8/8/8/8/8/4Q3/4K3 w");
    }

    #[test]
    fn placement_matches_input() {
        for fen in ["7k/5Q2/6K1/8/8/8/8/8 b", "8/8/8/3k4/8/8/R7/R3K3 w"] {
            assert_eq!(format(&parse(fen).unwrap()), fen);
        }
    }

    #[test]
    fn rejects_unsupported_material() {
        assert!(parse("4k3/8/8/8/8/8/4P3/4K3 w").is_err());
        assert!(parse("4k3/8/8/8/8/8/4q3/4K3 w").is_err());
        assert!(parse("8/8/8/8/8/8/4Q3/4K3 w").is_err());
        assert!(parse("4k3/8/8/8/8/8/4Q3 w").is_err());
        assert!(parse("4k3/8/8/8/8/8/4Q3/4K3 x").is_err());
    }
}
