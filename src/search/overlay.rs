//! Persistent position overlay: the base position plus hypothetical moves.
//!
//! An `Overlay` is an immutable view of "the real position after this
//! sequence of candidate moves". Queries scan the move chain from the
//! most recent move backward and only fall back to the base position when
//! no chain entry decides the square — the base is never touched. Two
//! overlays extended from a common ancestor share that ancestor's chain
//! nodes, so extending is O(1) and never alters a published overlay.

use std::rc::Rc;

use crate::board::base_position::BasePosition;
use crate::board::chess_move::{ChessMove, MoveKind};
use crate::board::chess_types::{Color, Piece, PieceKind, Square};

struct OverlayNode {
    mv: ChessMove,
    /// The piece standing on the capture square when the move was applied.
    captured: Option<Piece>,
    parent: Option<Rc<OverlayNode>>,
}

/// An immutable stack of hypothetical moves over a borrowed base position.
#[derive(Clone)]
pub struct Overlay<'b> {
    base: &'b BasePosition,
    head: Option<Rc<OverlayNode>>,
    ply_count: u16,
    king_squares: [Option<Square>; 2],
}

impl<'b> Overlay<'b> {
    /// The zero-move overlay: queries resolve straight to the base.
    pub fn root(base: &'b BasePosition) -> Self {
        Overlay {
            base,
            head: None,
            ply_count: 0,
            king_squares: [
                base.king_square(Color::Light),
                base.king_square(Color::Dark),
            ],
        }
    }

    #[inline]
    pub fn base(&self) -> &'b BasePosition {
        self.base
    }

    /// Number of hypothetical moves layered on the base (the future level).
    #[inline]
    pub fn future_level(&self) -> u16 {
        self.ply_count
    }

    /// Side to move, alternating from the base by chain-length parity.
    #[inline]
    pub fn turn_color(&self) -> Color {
        if self.ply_count % 2 == 0 {
            self.base.side_to_move
        } else {
            self.base.side_to_move.opposite()
        }
    }

    /// Occupant of a square under this overlay. Scans the chain newest to
    /// oldest: a move into the square wins unless a still-newer move left
    /// it again; castling rook hops and en-passant victims are resolved
    /// the same way.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        let mut link = self.head.as_ref();
        while let Some(node) = link {
            let mv = &node.mv;
            if mv.to == sq {
                return Some(mv.piece_after());
            }
            if mv.from == sq {
                return None;
            }
            match mv.kind {
                MoveKind::EnPassant(victim) if victim == sq => return None,
                MoveKind::Castle { rook_from, rook_to } => {
                    if rook_to == sq {
                        return Some(Piece::new(mv.piece.color, PieceKind::Rook));
                    }
                    if rook_from == sq {
                        return None;
                    }
                }
                _ => {}
            }
            link = node.parent.as_ref();
        }
        self.base.piece_at(sq)
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    #[inline]
    pub fn has_piece_of_color(&self, color: Color, sq: Square) -> bool {
        matches!(self.piece_at(sq), Some(p) if p.color == color)
    }

    /// Current square of the king of `color`, tracked incrementally.
    /// `None` for study positions without that king.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.king_squares[color.index()]
    }

    /// Pieces of `color` captured along this overlay's move sequence,
    /// newest first.
    pub fn captured_pieces(&self, color: Color) -> Vec<Piece> {
        let mut captured = Vec::new();
        let mut link = self.head.as_ref();
        while let Some(node) = link {
            if let Some(piece) = node.captured {
                if piece.color == color {
                    captured.push(piece);
                }
            }
            link = node.parent.as_ref();
        }
        captured
    }

    /// Piece count for one side under this overlay.
    pub fn piece_count(&self, color: Color) -> usize {
        self.base.piece_count(color) - self.captured_pieces(color).len()
    }

    /// The en-passant target square available to the side to move: the
    /// skipped square of a double step just played in the chain, or the
    /// base position's square when the chain is empty.
    pub fn en_passant_target(&self) -> Option<Square> {
        match self.head.as_ref() {
            Some(node) => match node.mv.kind {
                MoveKind::DoubleStep => {
                    Some(crate::board::chess_move::double_step_skipped_square(&node.mv))
                }
                _ => None,
            },
            None => self.base.en_passant_square,
        }
    }

    /// Whether the piece on `sq` has moved within this overlay's sequence.
    /// Castling legality also needs the base position's rights.
    pub fn moved_in_overlay(&self, sq: Square) -> bool {
        let mut link = self.head.as_ref();
        while let Some(node) = link {
            if node.mv.from == sq || node.mv.to == sq {
                return true;
            }
            link = node.parent.as_ref();
        }
        false
    }

    /// Layer one more hypothetical move on top, returning a new overlay.
    /// The receiver is unchanged and remains valid. The mover must stand
    /// on its claimed origin — anything else is a caller bug, not a
    /// runtime condition.
    pub fn extend(&self, mv: ChessMove) -> Overlay<'b> {
        debug_assert_eq!(
            self.piece_at(mv.from),
            Some(mv.piece),
            "extend precondition: mover not at claimed origin {}",
            mv.to_long_algebraic(),
        );

        let captured = match mv.kind {
            MoveKind::EnPassant(victim) => self.piece_at(victim),
            _ => self.piece_at(mv.to),
        };

        let mut king_squares = self.king_squares;
        if mv.piece.kind == PieceKind::King {
            king_squares[mv.piece.color.index()] = Some(mv.to);
        }
        if let Some(victim) = captured {
            if victim.kind == PieceKind::King {
                king_squares[victim.color.index()] = None;
            }
        }

        Overlay {
            base: self.base,
            head: Some(Rc::new(OverlayNode {
                mv,
                captured,
                parent: self.head.clone(),
            })),
            ply_count: self.ply_count + 1,
            king_squares,
        }
    }

    /// Iterate the squares holding pieces of `color` under this overlay.
    pub fn squares_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        (0..64u8).filter_map(move |sq| match self.piece_at(sq) {
            Some(piece) if piece.color == color => Some((sq, piece)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::chess_move::MoveKind;
    use crate::board::chess_types::PieceKind;

    fn light(kind: PieceKind) -> Piece {
        Piece::new(Color::Light, kind)
    }

    fn dark(kind: PieceKind) -> Piece {
        Piece::new(Color::Dark, kind)
    }

    #[test]
    fn extend_never_mutates_the_receiver() {
        let base = BasePosition::new_game();
        let root = Overlay::root(&base);
        let before: Vec<Option<Piece>> = (0..64).map(|sq| root.piece_at(sq)).collect();

        let pawn = root.piece_at(12).expect("e2 pawn");
        let extended = root.extend(ChessMove::regular(pawn, 12, 28));

        let after: Vec<Option<Piece>> = (0..64).map(|sq| root.piece_at(sq)).collect();
        assert_eq!(before, after, "published overlay must be unaffected");
        assert_eq!(extended.piece_at(28), Some(pawn));
        assert!(extended.is_empty(12));
        // And the base itself is untouched.
        assert_eq!(base.piece_at(12), Some(pawn));
    }

    #[test]
    fn chain_scan_prefers_newest_moves() {
        let base =
            BasePosition::from_fen("8/8/2R5/8/8/8/2r5/8 w - - 0 1").expect("fen should parse");
        let root = Overlay::root(&base);
        let light_rook = root.piece_at(42).expect("c6 rook");

        // Rook slides c6 -> c2 capturing, then wanders on. The square it
        // left must read empty even though an older move put it there.
        let first = root.extend(ChessMove::regular(light_rook, 42, 10));
        assert_eq!(first.piece_at(10), Some(light_rook));
        assert_eq!(first.captured_pieces(Color::Dark).len(), 1);

        let second = first.extend(ChessMove::regular(light_rook, 10, 14));
        assert!(second.is_empty(10));
        assert_eq!(second.piece_at(14), Some(light_rook));
        assert_eq!(second.piece_count(Color::Dark), 0);
        assert_eq!(second.piece_count(Color::Light), 1);
    }

    #[test]
    fn turn_alternates_by_chain_parity() {
        let base = BasePosition::new_game();
        let root = Overlay::root(&base);
        assert_eq!(root.turn_color(), Color::Light);

        let pawn = root.piece_at(12).expect("e2 pawn");
        let one = root.extend(ChessMove::regular(pawn, 12, 20));
        assert_eq!(one.turn_color(), Color::Dark);

        let reply = one.piece_at(52).expect("e7 pawn");
        let two = one.extend(ChessMove::regular(reply, 52, 44));
        assert_eq!(two.turn_color(), Color::Light);
        assert_eq!(two.future_level(), 2);
    }

    #[test]
    fn castling_relocates_the_rook_in_the_chain() {
        let base = BasePosition::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .expect("fen should parse");
        let root = Overlay::root(&base);
        let king = light(PieceKind::King);
        let castled = root.extend(ChessMove {
            piece: king,
            from: 4,
            to: 6,
            kind: MoveKind::Castle {
                rook_from: 7,
                rook_to: 5,
            },
        });
        assert_eq!(castled.piece_at(6), Some(king));
        assert_eq!(castled.piece_at(5), Some(light(PieceKind::Rook)));
        assert!(castled.is_empty(7));
        assert!(castled.is_empty(4));
        assert_eq!(castled.king_square(Color::Light), Some(6));
    }

    #[test]
    fn en_passant_removes_the_bypassing_pawn() {
        let base = BasePosition::from_fen("8/8/8/8/2pP4/8/8/8 b - d3 0 1")
            .expect("fen should parse");
        let root = Overlay::root(&base);
        assert_eq!(root.en_passant_target(), Some(19));

        let capture = root.extend(ChessMove {
            piece: dark(PieceKind::Pawn),
            from: 26,
            to: 19,
            kind: MoveKind::EnPassant(27),
        });
        assert!(capture.is_empty(27), "victim pawn square must be empty");
        assert_eq!(capture.piece_at(19), Some(dark(PieceKind::Pawn)));
        assert_eq!(capture.captured_pieces(Color::Light).len(), 1);
    }

    #[test]
    fn sibling_overlays_do_not_interfere() {
        let base = BasePosition::new_game();
        let root = Overlay::root(&base);
        let pawn = root.piece_at(12).expect("e2 pawn");
        let knight = root.piece_at(6).expect("g1 knight");

        let line_a = root.extend(ChessMove::regular(pawn, 12, 28));
        let line_b = root.extend(ChessMove::regular(knight, 6, 21));

        assert_eq!(line_a.piece_at(28), Some(pawn));
        assert!(line_a.is_empty(21));
        assert_eq!(line_b.piece_at(21), Some(knight));
        assert!(line_b.is_empty(28));
    }
}
