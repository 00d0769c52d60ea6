//! Move generation against a position overlay.
//!
//! All generation queries the overlay, never a mutable board, so the same
//! code serves the real position (empty overlay) and any hypothetical
//! line the search is exploring. Besides playable moves each generator
//! reports the own-piece squares the piece covers — the evaluator and the
//! clash layer need defended squares as much as reachable ones.

use crate::board::chess_move::{make_ep_victim, ChessMove, MoveKind};
use crate::board::chess_types::{square_rank, Color, Piece, PieceKind, Square};
use crate::board::piece_geometry::{
    offset, pawn_advance, pawn_attack_dirs, pawn_promotion_rank, pawn_start_rank, ray_squares,
    slider_dirs, KING_DIRS, KNIGHT_STEPS,
};
use crate::search::clash::{is_in_check, is_square_covered_by};
use crate::search::overlay::Overlay;

/// Pseudo-legal moves of one piece plus the own squares it defends.
#[derive(Debug, Default, Clone)]
pub struct GeneratedMoves {
    pub playable: Vec<ChessMove>,
    pub covers: Vec<Square>,
}

/// Pseudo-legal and covering moves of the piece on `from`. King-safety
/// filtering happens in `legal_moves_of_side`.
pub fn piece_moves(piece: Piece, from: Square, overlay: &Overlay) -> GeneratedMoves {
    debug_assert_eq!(
        overlay.piece_at(from),
        Some(piece),
        "move generation for a piece that is not there"
    );
    let mut out = GeneratedMoves::default();
    match piece.kind {
        PieceKind::Pawn => pawn_moves(piece, from, overlay, &mut out),
        PieceKind::Knight => step_moves(piece, from, overlay, &KNIGHT_STEPS, &mut out),
        PieceKind::King => {
            step_moves(piece, from, overlay, &KING_DIRS, &mut out);
            castling_moves(piece, from, overlay, &mut out);
        }
        _ => slide_moves(piece, from, overlay, &mut out),
    }
    out
}

fn push_step(piece: Piece, from: Square, to: Square, overlay: &Overlay, out: &mut GeneratedMoves) {
    match overlay.piece_at(to) {
        None => out.playable.push(ChessMove::regular(piece, from, to)),
        Some(other) if other.color != piece.color => {
            out.playable.push(ChessMove::regular(piece, from, to));
        }
        Some(_) => out.covers.push(to),
    }
}

fn step_moves(
    piece: Piece,
    from: Square,
    overlay: &Overlay,
    steps: &[(i8, i8)],
    out: &mut GeneratedMoves,
) {
    for &step in steps {
        if let Some(to) = offset(from, step) {
            push_step(piece, from, to, overlay, out);
        }
    }
}

fn slide_moves(piece: Piece, from: Square, overlay: &Overlay, out: &mut GeneratedMoves) {
    for &dir in slider_dirs(piece.kind) {
        for to in ray_squares(from, dir) {
            match overlay.piece_at(to) {
                None => out.playable.push(ChessMove::regular(piece, from, to)),
                Some(other) => {
                    if other.color != piece.color {
                        out.playable.push(ChessMove::regular(piece, from, to));
                    } else {
                        out.covers.push(to);
                    }
                    break;
                }
            }
        }
    }
}

fn pawn_moves(piece: Piece, from: Square, overlay: &Overlay, out: &mut GeneratedMoves) {
    let color = piece.color;
    let advance = pawn_advance(color);
    let promo_rank = pawn_promotion_rank(color);

    // Direct moves: blocked by any piece, never capture.
    if let Some(one) = offset(from, (0, advance)) {
        if overlay.is_empty(one) {
            push_pawn_playable(piece, from, one, promo_rank, MoveKind::Regular, out);
            if square_rank(from) == pawn_start_rank(color) {
                if let Some(two) = offset(from, (0, 2 * advance)) {
                    if overlay.is_empty(two) {
                        out.playable.push(ChessMove {
                            piece,
                            from,
                            to: two,
                            kind: MoveKind::DoubleStep,
                        });
                    }
                }
            }
        }
    }

    // Diagonal captures, en passant included.
    let ep_target = overlay.en_passant_target();
    for dir in pawn_attack_dirs(color) {
        let Some(to) = offset(from, dir) else {
            continue;
        };
        match overlay.piece_at(to) {
            Some(other) if other.color != color => {
                push_pawn_playable(piece, from, to, promo_rank, MoveKind::Regular, out);
            }
            Some(_) => out.covers.push(to),
            None => {
                if ep_target == Some(to) {
                    out.playable.push(ChessMove {
                        piece,
                        from,
                        to,
                        kind: MoveKind::EnPassant(make_ep_victim(from, to)),
                    });
                }
            }
        }
    }
}

fn push_pawn_playable(
    piece: Piece,
    from: Square,
    to: Square,
    promo_rank: u8,
    kind: MoveKind,
    out: &mut GeneratedMoves,
) {
    if square_rank(to) == promo_rank {
        // Queen and knight cover everything a promotion can want.
        for target in [PieceKind::Queen, PieceKind::Knight] {
            out.playable.push(ChessMove {
                piece,
                from,
                to,
                kind: MoveKind::Promote(target),
            });
        }
    } else {
        out.playable.push(ChessMove {
            piece,
            from,
            to,
            kind,
        });
    }
}

fn castling_moves(piece: Piece, from: Square, overlay: &Overlay, out: &mut GeneratedMoves) {
    use crate::board::base_position::{
        CASTLE_DARK_KINGSIDE, CASTLE_DARK_QUEENSIDE, CASTLE_LIGHT_KINGSIDE,
        CASTLE_LIGHT_QUEENSIDE,
    };

    let color = piece.color;
    let (kingside_right, queenside_right) = match color {
        Color::Light => (CASTLE_LIGHT_KINGSIDE, CASTLE_LIGHT_QUEENSIDE),
        Color::Dark => (CASTLE_DARK_KINGSIDE, CASTLE_DARK_QUEENSIDE),
    };
    let rank_base: Square = match color {
        Color::Light => 0,
        Color::Dark => 56,
    };
    if from != rank_base + 4 || is_in_check(color, overlay) {
        return;
    }

    let rights = overlay.base().castling_rights;
    let enemy = color.opposite();

    // Kingside: f and g empty, rook home, king's path unattacked.
    if rights & kingside_right != 0
        && !overlay.moved_in_overlay(from)
        && !overlay.moved_in_overlay(rank_base + 7)
        && overlay.piece_at(rank_base + 7) == Some(Piece::new(color, PieceKind::Rook))
        && overlay.is_empty(rank_base + 5)
        && overlay.is_empty(rank_base + 6)
        && !is_square_covered_by(enemy, rank_base + 5, overlay)
    {
        out.playable.push(ChessMove {
            piece,
            from,
            to: rank_base + 6,
            kind: MoveKind::Castle {
                rook_from: rank_base + 7,
                rook_to: rank_base + 5,
            },
        });
    }

    // Queenside: b, c and d empty, rook home, king's path unattacked.
    if rights & queenside_right != 0
        && !overlay.moved_in_overlay(from)
        && !overlay.moved_in_overlay(rank_base)
        && overlay.piece_at(rank_base) == Some(Piece::new(color, PieceKind::Rook))
        && overlay.is_empty(rank_base + 1)
        && overlay.is_empty(rank_base + 2)
        && overlay.is_empty(rank_base + 3)
        && !is_square_covered_by(enemy, rank_base + 3, overlay)
    {
        out.playable.push(ChessMove {
            piece,
            from,
            to: rank_base + 2,
            kind: MoveKind::Castle {
                rook_from: rank_base,
                rook_to: rank_base + 3,
            },
        });
    }
}

/// Whether playing `mv` would leave the mover's own king attacked.
pub fn leaves_king_exposed(mv: &ChessMove, overlay: &Overlay) -> bool {
    let after = overlay.extend(*mv);
    is_in_check(mv.piece.color, &after)
}

/// All legal moves of `color` under `overlay`.
pub fn legal_moves_of_side(overlay: &Overlay, color: Color) -> Vec<ChessMove> {
    let mut moves = Vec::new();
    for (sq, piece) in overlay.squares_of(color) {
        let generated = piece_moves(piece, sq, overlay);
        moves.extend(
            generated
                .playable
                .into_iter()
                .filter(|mv| !leaves_king_exposed(mv, overlay)),
        );
    }
    moves
}

/// Capture moves of one piece (playable moves whose destination holds an
/// enemy piece, or en passant), with their victims.
pub fn capture_targets(
    piece: Piece,
    from: Square,
    overlay: &Overlay,
) -> Vec<(ChessMove, Piece)> {
    piece_moves(piece, from, overlay)
        .playable
        .into_iter()
        .filter_map(|mv| {
            let victim = match mv.kind {
                MoveKind::EnPassant(victim_sq) => overlay.piece_at(victim_sq),
                _ => overlay.piece_at(mv.to),
            }?;
            (victim.color != piece.color).then_some((mv, victim))
        })
        .collect()
}
