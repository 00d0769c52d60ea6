//! Movement geometry tables and helpers per piece kind.
//!
//! Directions are (file, rank) deltas. Pawn behavior differs from the
//! other kinds (blocked direct moves, diagonal-only captures, promotion),
//! which is expressed here through per-kind predicates on `PieceKind`
//! rather than through separate piece types.

use crate::board::chess_types::{square_file, square_rank, Color, PieceKind, Square};

/// A (file, rank) step.
pub type Dir = (i8, i8);

pub const ROOK_DIRS: [Dir; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const BISHOP_DIRS: [Dir; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const KING_DIRS: [Dir; 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
pub const KNIGHT_STEPS: [Dir; 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Apply a step to a square, returning `None` off the board.
#[inline]
pub fn offset(sq: Square, dir: Dir) -> Option<Square> {
    let file = square_file(sq) as i8 + dir.0;
    let rank = square_rank(sq) as i8 + dir.1;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as Square)
    } else {
        None
    }
}

/// Whether the kind moves along rays (bishop, rook, queen).
#[inline]
pub fn is_slider(kind: PieceKind) -> bool {
    matches!(
        kind,
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
    )
}

/// Ray directions a sliding kind travels; empty for non-sliders.
pub fn slider_dirs(kind: PieceKind) -> &'static [Dir] {
    match kind {
        PieceKind::Bishop => &BISHOP_DIRS,
        PieceKind::Rook => &ROOK_DIRS,
        PieceKind::Queen => &KING_DIRS,
        _ => &[],
    }
}

/// Whether a slider of `kind` travels along `dir`.
#[inline]
pub fn kind_slides_in(kind: PieceKind, dir: Dir) -> bool {
    match kind {
        PieceKind::Rook => dir.0 == 0 || dir.1 == 0,
        PieceKind::Bishop => dir.0 != 0 && dir.1 != 0,
        PieceKind::Queen => true,
        _ => false,
    }
}

/// The unit direction from `from` to `to` when the squares share a rank,
/// file, or diagonal; `None` otherwise.
pub fn dir_between(from: Square, to: Square) -> Option<Dir> {
    if from == to {
        return None;
    }
    let df = square_file(to) as i8 - square_file(from) as i8;
    let dr = square_rank(to) as i8 - square_rank(from) as i8;
    if df == 0 {
        Some((0, dr.signum()))
    } else if dr == 0 {
        Some((df.signum(), 0))
    } else if df.abs() == dr.abs() {
        Some((df.signum(), dr.signum()))
    } else {
        None
    }
}

/// Squares along a ray from `from` (exclusive) in direction `dir`, in
/// walking order until the board edge.
pub fn ray_squares(from: Square, dir: Dir) -> impl Iterator<Item = Square> {
    let mut current = Some(from);
    std::iter::from_fn(move || {
        current = current.and_then(|sq| offset(sq, dir));
        current
    })
}

/// Rank delta a pawn of `color` advances by.
#[inline]
pub const fn pawn_advance(color: Color) -> i8 {
    match color {
        Color::Light => 1,
        Color::Dark => -1,
    }
}

/// Rank a pawn of `color` double-steps from.
#[inline]
pub const fn pawn_start_rank(color: Color) -> u8 {
    match color {
        Color::Light => 1,
        Color::Dark => 6,
    }
}

/// Rank a pawn of `color` promotes on.
#[inline]
pub const fn pawn_promotion_rank(color: Color) -> u8 {
    match color {
        Color::Light => 7,
        Color::Dark => 0,
    }
}

/// The two capture steps of a pawn of `color`.
#[inline]
pub const fn pawn_attack_dirs(color: Color) -> [Dir; 2] {
    match color {
        Color::Light => [(-1, 1), (1, 1)],
        Color::Dark => [(-1, -1), (1, -1)],
    }
}
