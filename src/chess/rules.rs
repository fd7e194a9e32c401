use std::fmt;

use crate::chess::board::{bit, Board};
use crate::chess::piece::{Color, PieceKind, KNIGHT_DELTAS};
use crate::core::coord::{Coord, KING_STEPS};
use crate::core::square::Square;
use crate::oracle::{OracleError, Outcome};

/// A move in from/to form. Promotions never arise in these endgames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
}

impl ChessMove {
    /// Parse UCI notation (`e2e4`).
    pub fn parse(uci: &str) -> Option<ChessMove> {
        if uci.len() != 4 || !uci.is_ascii() {
            return None;
        }
        Some(ChessMove {
            from: Square::parse(&uci[..2])?,
            to: Square::parse(&uci[2..])?,
        })
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Does a white `kind` on `from` attack `target`, given the occupied squares?
#[inline]
fn piece_attacks(kind: PieceKind, from: Square, target: Square, occupancy: u64) -> bool {
    let d = target.coord() - from.coord();
    match kind {
        PieceKind::Knight => {
            let ax = d.x.abs();
            let ay = d.y.abs();
            (ax == 2 && ay == 1) || (ax == 1 && ay == 2)
        }
        _ => rider_attacks(kind.slide_dirs(), from, d, occupancy),
    }
}

fn rider_attacks(dirs: &[Coord], from: Square, v: Coord, occupancy: u64) -> bool {
    let Some((dir, dist)) = normalized_dir_and_distance(v) else {
        return false;
    };
    if !dirs.contains(&dir) {
        return false;
    }
    // Any occupied square strictly between blocks the ray.
    (1..dist).all(|s| match from.offset(dir * s) {
        Some(sq) => occupancy & bit(sq) == 0,
        None => false,
    })
}

#[inline]
fn normalized_dir_and_distance(v: Coord) -> Option<(Coord, i32)> {
    let dx = v.x;
    let dy = v.y;

    // rook-like
    if dx == 0 && dy != 0 {
        return Some((Coord::new(0, dy.signum()), dy.abs()));
    }
    if dy == 0 && dx != 0 {
        return Some((Coord::new(dx.signum(), 0), dx.abs()));
    }

    // bishop-like
    if dx != 0 && dx.abs() == dy.abs() {
        return Some((Coord::new(dx.signum(), dy.signum()), dx.abs()));
    }

    None
}

/// Is `target` attacked by white's non-king material?
///
/// `occupancy` is passed in so callers can lift the black king off its square (a slider
/// keeps attacking through the square the king is leaving) or drop a captured piece.
fn white_material_attacks(
    board: &Board,
    target: Square,
    occupancy: u64,
    skip: Option<Square>,
) -> bool {
    board
        .pieces()
        .iter()
        .filter(|&&(sq, _)| Some(sq) != skip)
        .any(|&(sq, kind)| piece_attacks(kind, sq, target, occupancy))
}

pub fn black_in_check(board: &Board) -> bool {
    white_material_attacks(board, board.black_king(), board.occupancy(), None)
}

/// Only black can ever be in check: the lone king cannot give check.
pub fn in_check(board: &Board) -> bool {
    board.to_move() == Color::Black && black_in_check(board)
}

pub fn legal_moves(board: &Board) -> Vec<ChessMove> {
    match board.to_move() {
        Color::White => white_moves(board),
        Color::Black => black_moves(board),
    }
}

fn white_moves(board: &Board) -> Vec<ChessMove> {
    let mut out = Vec::new();
    let occupancy = board.occupancy();
    let bk = board.black_king().coord();

    let from = board.white_king();
    for &d in &KING_STEPS {
        let Some(to) = from.offset(d) else { continue };
        // Kings can't be adjacent.
        if to.coord().touches(bk) || to.coord() == bk {
            continue;
        }
        if board.piece_at(to).is_some() {
            continue;
        }
        out.push(ChessMove { from, to });
    }

    for &(from, kind) in board.pieces() {
        match kind {
            PieceKind::Knight => {
                for &d in &KNIGHT_DELTAS {
                    let Some(to) = from.offset(d) else { continue };
                    if occupancy & bit(to) == 0 {
                        out.push(ChessMove { from, to });
                    }
                }
            }
            PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen => {
                for &dir in kind.slide_dirs() {
                    let mut step = 1;
                    // Any unit, including the black king, stops the slide.
                    while let Some(to) = from.offset(dir * step) {
                        if occupancy & bit(to) != 0 {
                            break;
                        }
                        out.push(ChessMove { from, to });
                        step += 1;
                    }
                }
            }
        }
    }

    out
}

fn black_moves(board: &Board) -> Vec<ChessMove> {
    let from = board.black_king();
    KING_STEPS
        .iter()
        .filter_map(|&d| from.offset(d))
        .filter(|&to| black_king_may_enter(board, to))
        .map(|to| ChessMove { from, to })
        .collect()
}

/// `to` must be a king step away from the black king.
fn black_king_may_enter(board: &Board, to: Square) -> bool {
    let wk = board.white_king().coord();
    if to.coord() == wk || to.coord().touches(wk) {
        return false;
    }
    let lifted = board.occupancy() & !bit(board.black_king());
    // A capture removes the piece from both the blockers and the attackers.
    let captured = board.piece_at(to).map(|_| to);
    !white_material_attacks(board, to, lifted, captured)
}

/// Is `mv` one of [`legal_moves`]? Checks only the moving unit's own geometry.
pub fn is_legal(board: &Board, mv: ChessMove) -> bool {
    let step = (mv.to.coord() - mv.from.coord()).chebyshev_norm() == 1;
    match board.to_move() {
        Color::Black => mv.from == board.black_king() && step && black_king_may_enter(board, mv.to),
        Color::White if mv.from == board.white_king() => {
            let bk = board.black_king().coord();
            step && !mv.to.coord().touches(bk) && board.occupancy() & bit(mv.to) == 0
        }
        Color::White => {
            let occupancy = board.occupancy();
            match board.piece_at(mv.from) {
                Some(kind) => {
                    occupancy & bit(mv.to) == 0 && piece_attacks(kind, mv.from, mv.to, occupancy)
                }
                None => false,
            }
        }
    }
}

/// Apply `mv` if it is legal on `board`.
pub fn apply(board: &Board, mv: ChessMove) -> Result<Board, OracleError> {
    if !is_legal(board, mv) {
        return Err(OracleError::IllegalMove {
            notation: mv.to_string(),
            state: crate::chess::fen::format(board),
        });
    }
    Ok(board.with_move(mv.from, mv.to))
}

/// Mate, stalemate, then dead material.
pub fn classify(board: &Board) -> Outcome {
    if legal_moves(board).is_empty() {
        return if in_check(board) {
            Outcome::LossForMover
        } else {
            Outcome::Draw
        };
    }
    if board.is_insufficient_material() {
        return Outcome::Draw;
    }
    Outcome::Ongoing
}
