//! Bounded top-K move ranking.
//!
//! One insertion routine serves every place the search keeps a pruned,
//! sorted candidate set: pre-evaluation ranking, deep-search re-ranking,
//! and opponent counter-capture lists. The sorted list is bounded; moves
//! displaced past the bound land unsorted on an overflow list so that the
//! final ranking can still return every generated move.

use crate::board::chess_types::Color;
use crate::search::move_candidate::MoveCandidate;

/// Insert `candidate` into `top`, kept sorted best-to-worst for `color`
/// and bounded to `max_top` entries; whatever falls off the end is pushed
/// onto `overflow`. Returns whether the candidate became the new best.
///
/// Linear scan from the worst end — `max_top` is small everywhere this is
/// used, so anything fancier would not pay for itself.
pub fn insert_ranked(
    candidate: MoveCandidate,
    top: &mut Vec<MoveCandidate>,
    color: Color,
    max_top: usize,
    overflow: &mut Vec<MoveCandidate>,
) -> bool {
    debug_assert!(max_top > 0);

    let mut idx = top.len();
    while idx > 0 && candidate.eval.is_better_for(color, &top[idx - 1].eval) {
        idx -= 1;
    }

    if idx >= max_top {
        overflow.push(candidate);
        return false;
    }

    top.insert(idx, candidate);
    if top.len() > max_top {
        let displaced = top.pop().expect("list over bound has a tail");
        overflow.push(displaced);
    }
    idx == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::chess_move::ChessMove;
    use crate::board::chess_types::{Color, Piece, PieceKind, Score};

    fn candidate(from: u8, to: u8, ply0: Score) -> MoveCandidate {
        let mv = ChessMove::regular(Piece::new(Color::Light, PieceKind::Rook), from, to);
        let mut cand = MoveCandidate::new(mv);
        cand.eval.add(ply0, 0);
        cand
    }

    fn assert_sorted_for(color: Color, list: &[MoveCandidate]) {
        for pair in list.windows(2) {
            assert!(
                !pair[1].eval.is_better_for(color, &pair[0].eval),
                "list must be sorted best-to-worst"
            );
        }
    }

    #[test]
    fn first_insert_is_trivially_best() {
        let mut top = Vec::new();
        let mut overflow = Vec::new();
        assert!(insert_ranked(
            candidate(0, 1, -300),
            &mut top,
            Color::Light,
            4,
            &mut overflow
        ));
        assert_eq!(top.len(), 1);
        assert!(overflow.is_empty());
    }

    #[test]
    fn bound_holds_and_displaced_moves_overflow() {
        let mut top = Vec::new();
        let mut overflow = Vec::new();
        let scores = [50, 400, -100, 250, 0, 900, 150];
        for (i, score) in scores.into_iter().enumerate() {
            insert_ranked(
                candidate(i as u8, 63 - i as u8, score),
                &mut top,
                Color::Light,
                3,
                &mut overflow,
            );
            assert!(top.len() <= 3);
            assert_sorted_for(Color::Light, &top);
        }
        assert_eq!(top.len() + overflow.len(), scores.len());
        assert_eq!(top[0].eval.slot(0), 900);
        assert_eq!(top[1].eval.slot(0), 400);
        assert_eq!(top[2].eval.slot(0), 250);
    }

    #[test]
    fn sorting_respects_the_color_perspective() {
        let mut top = Vec::new();
        let mut overflow = Vec::new();
        for score in [100, -500, 300, -200] {
            insert_ranked(
                candidate(0, 1, score),
                &mut top,
                Color::Dark,
                4,
                &mut overflow,
            );
        }
        // Dark prefers negative board-absolute scores.
        assert_eq!(top[0].eval.slot(0), -500);
        assert_sorted_for(Color::Dark, &top);
    }

    #[test]
    fn new_best_is_reported_only_at_the_front() {
        let mut top = Vec::new();
        let mut overflow = Vec::new();
        assert!(insert_ranked(candidate(0, 1, 100), &mut top, Color::Light, 3, &mut overflow));
        assert!(insert_ranked(candidate(2, 3, 200), &mut top, Color::Light, 3, &mut overflow));
        assert!(!insert_ranked(candidate(4, 5, 150), &mut top, Color::Light, 3, &mut overflow));
        assert!(!insert_ranked(candidate(6, 7, 50), &mut top, Color::Light, 3, &mut overflow));
    }
}
