//! Immutable base position under the search overlay.
//!
//! `BasePosition` is a plain mailbox snapshot of the real game: piece
//! placement, side to move, castling rights, en-passant square, and the
//! move clocks. The search never mutates it — hypothetical play happens in
//! `search::overlay` views layered on top.

use crate::board::chess_types::{Color, Piece, PieceKind, Square};
use crate::errors::EngineError;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

pub const STARTING_POSITION_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Compact castling rights bitmask.
pub const CASTLE_LIGHT_KINGSIDE: CastlingRights = 1 << 0;
pub const CASTLE_LIGHT_QUEENSIDE: CastlingRights = 1 << 1;
pub const CASTLE_DARK_KINGSIDE: CastlingRights = 1 << 2;
pub const CASTLE_DARK_QUEENSIDE: CastlingRights = 1 << 3;
pub type CastlingRights = u8;

/// Snapshot of the real game the search reasons about.
#[derive(Debug, Clone)]
pub struct BasePosition {
    pub squares: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

impl Default for BasePosition {
    fn default() -> Self {
        BasePosition {
            squares: [None; 64],
            side_to_move: Color::Light,
            castling_rights: 0,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl BasePosition {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq as usize]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq as usize].is_none()
    }

    /// Number of pieces on the board for one side.
    pub fn piece_count(&self, color: Color) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|p| p.color == color)
            .count()
    }

    /// Locate the king. Test and study positions may legitimately omit a
    /// king, so absence is not an error here; check detection treats a
    /// kingless side as never in check.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        (0..64u8).find(|&sq| self.squares[sq as usize] == Some(Piece::new(color, PieceKind::King)))
    }

    /// Whether the given castling right is still available, matching the
    /// pieces actually standing on their home squares.
    pub fn castling_allowed(&self, right: CastlingRights) -> bool {
        self.castling_rights & right != 0
    }

    /// Commit a searched move to produce the next real position. The caller
    /// is expected to have verified legality; this only performs the
    /// mechanical update.
    pub fn play(&self, mv: &crate::board::chess_move::ChessMove) -> BasePosition {
        use crate::board::chess_move::{double_step_skipped_square, MoveKind};

        let mut next = self.clone();
        let captured = next.squares[mv.to as usize];
        next.squares[mv.from as usize] = None;
        next.squares[mv.to as usize] = Some(mv.piece_after());
        next.en_passant_square = None;

        match mv.kind {
            MoveKind::DoubleStep => {
                next.en_passant_square = Some(double_step_skipped_square(mv));
            }
            MoveKind::EnPassant(victim) => {
                next.squares[victim as usize] = None;
            }
            MoveKind::Castle { rook_from, rook_to } => {
                let rook = next.squares[rook_from as usize].take();
                next.squares[rook_to as usize] = rook;
            }
            _ => {}
        }

        // Any king or rook leaving (or being captured on) a home square
        // forfeits the associated castling right.
        for sq in [mv.from, mv.to] {
            next.castling_rights &= !right_lost_at(sq);
        }

        if mv.piece.kind == PieceKind::Pawn || captured.is_some() {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock += 1;
        }
        if self.side_to_move == Color::Dark {
            next.fullmove_number += 1;
        }
        next.side_to_move = self.side_to_move.opposite();
        next
    }
}

fn right_lost_at(sq: Square) -> CastlingRights {
    match sq {
        0 => CASTLE_LIGHT_QUEENSIDE,
        4 => CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE,
        7 => CASTLE_LIGHT_KINGSIDE,
        56 => CASTLE_DARK_QUEENSIDE,
        60 => CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE,
        63 => CASTLE_DARK_KINGSIDE,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::chess_move::ChessMove;

    #[test]
    fn starting_position_has_full_armies() {
        let position = BasePosition::new_game();
        assert_eq!(position.piece_count(Color::Light), 16);
        assert_eq!(position.piece_count(Color::Dark), 16);
        assert_eq!(position.king_square(Color::Light), Some(4));
        assert_eq!(position.king_square(Color::Dark), Some(60));
        assert_eq!(position.side_to_move, Color::Light);
    }

    #[test]
    fn playing_a_move_flips_turn_and_clears_origin() {
        let position = BasePosition::new_game();
        let pawn = position.piece_at(12).expect("e2 pawn");
        let next = position.play(&ChessMove::regular(pawn, 12, 28));
        assert!(next.is_empty(12));
        assert_eq!(next.piece_at(28), Some(pawn));
        assert_eq!(next.side_to_move, Color::Dark);
        // The original is untouched.
        assert_eq!(position.piece_at(12), Some(pawn));
    }

    #[test]
    fn rook_moves_forfeit_castling() {
        let position = BasePosition::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .expect("fen should parse");
        let rook = position.piece_at(0).expect("a1 rook");
        let next = position.play(&ChessMove::regular(rook, 0, 8));
        assert!(!next.castling_allowed(CASTLE_LIGHT_QUEENSIDE));
        assert!(next.castling_allowed(CASTLE_LIGHT_KINGSIDE));
        assert!(next.castling_allowed(CASTLE_DARK_KINGSIDE));
    }
}
