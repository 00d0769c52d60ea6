//! Move representation and long-algebraic conversions.
//!
//! `ChessMove` identifies a moving piece together with its origin and
//! destination; the `MoveKind` carries the bookkeeping for promotions,
//! double pawn steps, en passant and castling. Identity is structural on
//! (from, to, promotion) — two moves with the same coordinates are the
//! same move regardless of how they were generated or scored.

use crate::board::chess_types::{square_file, square_rank, Piece, PieceKind, Square};
use crate::errors::EngineError;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

/// Non-regular aspects of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Regular,
    /// Pawn double step; the skipped square becomes capturable en passant.
    DoubleStep,
    /// Pawn promotion to the given kind on reaching the last rank.
    Promote(PieceKind),
    /// En passant capture; the square holding the captured pawn.
    EnPassant(Square),
    /// Castling; the rook relocation that accompanies the king move.
    Castle { rook_from: Square, rook_to: Square },
}

/// A move of one piece, as generated against an overlay.
#[derive(Debug, Clone, Copy)]
pub struct ChessMove {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl PartialEq for ChessMove {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to && self.promotion() == other.promotion()
    }
}

impl Eq for ChessMove {}

impl ChessMove {
    pub fn regular(piece: Piece, from: Square, to: Square) -> Self {
        ChessMove {
            piece,
            from,
            to,
            kind: MoveKind::Regular,
        }
    }

    /// The promotion target, if this move is a promotion.
    #[inline]
    pub fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promote(kind) => Some(kind),
            _ => None,
        }
    }

    /// The piece as it stands on the destination square, promotion applied.
    #[inline]
    pub fn piece_after(&self) -> Piece {
        match self.kind {
            MoveKind::Promote(kind) => Piece::new(self.piece.color, kind),
            _ => self.piece,
        }
    }

    /// Long algebraic rendering, e.g. "e2e4" or "e7e8q". This is the only
    /// externally meaningful textual form of a move.
    pub fn to_long_algebraic(&self) -> String {
        let mut s = format!(
            "{}{}",
            square_to_algebraic(self.from),
            square_to_algebraic(self.to)
        );
        if let Some(kind) = self.promotion() {
            s.push(kind.promotion_char());
        }
        s
    }

    /// Parse a long-algebraic string against a position snapshot provided as
    /// a closure from square to occupant. Castling and en passant are
    /// recognized from the board context, mirroring the rendering above.
    pub fn from_long_algebraic<F>(text: &str, piece_at: F) -> Result<Self, EngineError>
    where
        F: Fn(Square) -> Option<Piece>,
    {
        let text = text.trim();
        if text.len() < 4 || text.len() > 5 {
            return Err(EngineError::InvalidAlgebraicString(text.to_owned()));
        }
        let from = algebraic_to_square(&text[0..2])?;
        let to = algebraic_to_square(&text[2..4])?;
        let piece = piece_at(from).ok_or_else(|| EngineError::NoPieceToMove(text[0..2].to_owned()))?;

        let kind = if text.len() == 5 {
            let promo = match text.as_bytes()[4] as char {
                'q' | 'Q' => PieceKind::Queen,
                'r' | 'R' => PieceKind::Rook,
                'b' | 'B' => PieceKind::Bishop,
                'n' | 'N' => PieceKind::Knight,
                ch => return Err(EngineError::InvalidAlgebraicChar(ch)),
            };
            MoveKind::Promote(promo)
        } else if piece.kind == PieceKind::King && square_file(from) == 4 && from.abs_diff(to) == 2
        {
            // King jumping two files is castling; rook squares follow.
            let rank = square_rank(from);
            if square_file(to) == 6 {
                MoveKind::Castle {
                    rook_from: rank * 8 + 7,
                    rook_to: rank * 8 + 5,
                }
            } else {
                MoveKind::Castle {
                    rook_from: rank * 8,
                    rook_to: rank * 8 + 3,
                }
            }
        } else if piece.kind == PieceKind::Pawn
            && square_file(from) != square_file(to)
            && piece_at(to).is_none()
        {
            // Diagonal pawn move to an empty square must be en passant.
            MoveKind::EnPassant(make_ep_victim(from, to))
        } else if piece.kind == PieceKind::Pawn && square_rank(from).abs_diff(square_rank(to)) == 2
        {
            MoveKind::DoubleStep
        } else {
            MoveKind::Regular
        };

        Ok(ChessMove {
            piece,
            from,
            to,
            kind,
        })
    }
}

/// The square of the pawn captured en passant: the destination file on the
/// origin rank.
#[inline]
pub fn make_ep_victim(from: Square, to: Square) -> Square {
    square_rank(from) * 8 + square_file(to)
}

/// The en-passant target square a double step exposes (the skipped square).
#[inline]
pub fn double_step_skipped_square(mv: &ChessMove) -> Square {
    (mv.from + mv.to) / 2
}

impl std::fmt::Display for ChessMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_long_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::chess_types::{Color, Piece, PieceKind};

    fn pawn(color: Color) -> Piece {
        Piece::new(color, PieceKind::Pawn)
    }

    #[test]
    fn renders_plain_and_promotion_moves() {
        let mv = ChessMove::regular(pawn(Color::Light), 12, 28);
        assert_eq!(mv.to_long_algebraic(), "e2e4");

        let promo = ChessMove {
            piece: pawn(Color::Light),
            from: 52,
            to: 60,
            kind: MoveKind::Promote(PieceKind::Queen),
        };
        assert_eq!(promo.to_long_algebraic(), "e7e8q");
    }

    #[test]
    fn parsing_round_trips_rendering() {
        let board = |sq: Square| match sq {
            12 => Some(pawn(Color::Light)),
            52 => Some(pawn(Color::Light)),
            _ => None,
        };
        for text in ["e2e4", "e7e8q", "e7e8n"] {
            let mv = ChessMove::from_long_algebraic(text, board).expect("should parse");
            assert_eq!(mv.to_long_algebraic(), text);
        }
    }

    #[test]
    fn equality_ignores_generation_details() {
        let a = ChessMove::regular(pawn(Color::Light), 12, 28);
        let mut b = a;
        b.kind = MoveKind::DoubleStep;
        // Same coordinates, no promotion on either side: the same move.
        assert_eq!(a, b);
    }

    #[test]
    fn castling_recognized_from_king_jump() {
        let board = |sq: Square| match sq {
            4 => Some(Piece::new(Color::Light, PieceKind::King)),
            _ => None,
        };
        let mv = ChessMove::from_long_algebraic("e1g1", board).expect("should parse");
        assert_eq!(
            mv.kind,
            MoveKind::Castle {
                rook_from: 7,
                rook_to: 5
            }
        );
    }
}
