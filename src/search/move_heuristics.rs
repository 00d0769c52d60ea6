//! Heuristic evaluation of a single candidate move.
//!
//! Estimates what one move is worth without recursing into deeper search:
//! direct capture, the opponent's recapture on the destination, slider
//! lines the move opens or blocks, follow-up captures and forks from the
//! new square, newly enabled defensive cover, lost capture opportunities,
//! and the opponent's best remaining capture elsewhere. Every term is
//! tagged with the ply it can materialize on, which is what the vector
//! comparison rule feeds on.

use std::collections::HashMap;

use crate::board::chess_move::{ChessMove, MoveKind};
use crate::board::chess_types::{Color, Score, Square, PAWN_VALUE};
use crate::board::move_generation::{capture_targets, piece_moves};
use crate::board::piece_geometry::{is_slider, kind_slides_in, ray_squares, KING_DIRS};
use crate::search::clash::{build_clash_mask, is_in_check, ClashCache};
use crate::search::move_candidate::MoveCandidate;
use crate::search::overlay::Overlay;

/// Flat per-color worth of covering a square or piece when no concrete
/// capture is behind it. Tunable.
pub const COVERAGE_VALUE: Score = 20;

/// A second follow-up capture counts as a fork partner when it reaches
/// this fraction (two thirds) of the best one.
const FORK_NUMERATOR: Score = 2;
const FORK_DENOMINATOR: Score = 3;

/// Evaluate `mv` against `overlay` without recursion. Returns `None` when
/// the move is illegal after the overlay (it would leave the mover's own
/// king attacked); game-ending detection is the search's business.
pub fn evaluate_move(
    mv: ChessMove,
    overlay: &Overlay,
    clash: &mut ClashCache,
    trace: bool,
) -> Option<MoveCandidate> {
    let color = mv.piece.color;
    let enemy = color.opposite();
    let sign = color.sign();

    let victim = match mv.kind {
        MoveKind::EnPassant(victim_sq) => overlay.piece_at(victim_sq),
        _ => overlay.piece_at(mv.to),
    };

    let after = overlay.extend(mv);
    if is_in_check(color, &after) {
        return None;
    }

    let mut cand = MoveCandidate::new(mv);
    cand.gives_check = is_in_check(enemy, &after);

    // 1. Direct material swing: capture value plus what a promotion adds.
    if let Some(victim) = victim {
        let gain = victim.kind.value();
        cand.eval.add(sign * gain, 0);
        if trace {
            cand.rationale
                .push(format!("captures {:?} worth {gain}", victim.kind));
        }
    }
    if let MoveKind::Promote(target) = mv.kind {
        cand.eval.add(sign * (target.value() - PAWN_VALUE), 0);
        if trace {
            cand.rationale.push(format!("promotes to {target:?}"));
        }
    }

    // 2. The opponent may take the mover back on the destination square.
    let enemy_mask = build_clash_mask(enemy, mv.to, &after);
    let own_mask = build_clash_mask(color, mv.to, &after);
    if !enemy_mask.is_empty() {
        let exchange = clash.resolve(mv.piece_after().kind, enemy_mask, own_mask);
        if exchange.score > 0 {
            cand.eval.add(-sign * exchange.score, 1);
            if trace {
                cand.rationale.push(format!(
                    "recapture on {} costs {}",
                    crate::utils::algebraic::square_to_algebraic(mv.to),
                    exchange.score
                ));
            }
        }
    }

    // 3. Slider lines opened through the vacated origin and blocked at
    //    the destination.
    score_opened_lines(&mut cand, &mv, &after, clash, trace);
    score_blocked_lines(&mut cand, &mv, overlay, clash, trace);

    // 4. Follow-up captures the mover itself now threatens.
    score_follow_ups(&mut cand, &mv, overlay, &after, clash, sign, trace);

    // 5. Best newly enabled cover of an own piece.
    score_new_cover(&mut cand, &mv, overlay, &after, clash, sign, trace);

    // 6. Best capture opportunity this move gives up.
    score_lost_captures(&mut cand, &mv, overlay, &after, clash, sign, trace);

    // 7. The opponent still gets one reply: their best remaining capture
    //    elsewhere on the board.
    let reply = best_enemy_capture_elsewhere(&mv, &after, clash);
    if reply > 0 {
        cand.eval.add(-sign * reply, 1);
        if trace {
            cand.rationale.push(format!("opponent reply worth {reply}"));
        }
    }

    Some(cand)
}

/// The immediate material swing of a move (capture value plus what a
/// promotion adds), used by the search when folding a deep-searched reply
/// back into the candidate.
pub fn immediate_material_gain(mv: &ChessMove, overlay: &Overlay) -> Score {
    let victim = match mv.kind {
        MoveKind::EnPassant(victim_sq) => overlay.piece_at(victim_sq),
        _ => overlay.piece_at(mv.to),
    };
    let mut gain = victim.map_or(0, |p| p.kind.value());
    if let MoveKind::Promote(target) = mv.kind {
        gain += target.value() - PAWN_VALUE;
    }
    gain
}

/// Favorable exchange value of capturing the piece on `target` for
/// `attacker_color`, zero when the exchange is refused.
fn favorable_exchange(
    attacker_color: Color,
    target: Square,
    overlay: &Overlay,
    clash: &mut ClashCache,
) -> Score {
    let Some(occupant) = overlay.piece_at(target) else {
        return 0;
    };
    let attackers = build_clash_mask(attacker_color, target, overlay);
    if attackers.is_empty() {
        return 0;
    }
    let defenders = build_clash_mask(attacker_color.opposite(), target, overlay);
    clash.resolve(occupant.kind, attackers, defenders).score.max(0)
}

/// Sliders whose line now passes through the vacated origin square gain
/// whatever their extended ray reaches first.
fn score_opened_lines(
    cand: &mut MoveCandidate,
    mv: &ChessMove,
    after: &Overlay,
    clash: &mut ClashCache,
    trace: bool,
) {
    let mover_color = mv.piece.color;
    for dir in KING_DIRS {
        // The nearest piece that slides along this line toward the origin.
        let mut beneficiary = None;
        for sq in ray_squares(mv.from, dir) {
            if sq == mv.to {
                break;
            }
            if let Some(piece) = after.piece_at(sq) {
                if is_slider(piece.kind) && kind_slides_in(piece.kind, dir) {
                    beneficiary = Some(piece);
                }
                break;
            }
        }
        let Some(slider) = beneficiary else { continue };

        // Walk the freed extension of its line, away from the slider.
        let extension = (-dir.0, -dir.1);
        for sq in ray_squares(mv.from, extension) {
            let Some(reached) = after.piece_at(sq) else {
                continue;
            };
            if sq == mv.to {
                // Attacks on the mover's new square are step 2's business.
                break;
            }
            let slider_sign = slider.color.sign();
            let delay = if slider.color == mover_color { 2 } else { 1 };
            if reached.color != slider.color {
                let est = favorable_exchange(slider.color, sq, after, clash);
                if est > 0 {
                    cand.eval.add(slider_sign * est, delay);
                    if trace {
                        cand.rationale.push(format!(
                            "opens {:?} line onto {} worth {est}",
                            slider.kind,
                            crate::utils::algebraic::square_to_algebraic(sq)
                        ));
                    }
                }
            } else {
                cand.eval.add(slider_sign * COVERAGE_VALUE, delay);
            }
            break;
        }
    }
}

/// Sliders that could see through the destination square before the move
/// lose whatever lay beyond it.
fn score_blocked_lines(
    cand: &mut MoveCandidate,
    mv: &ChessMove,
    overlay: &Overlay,
    clash: &mut ClashCache,
    trace: bool,
) {
    if overlay.piece_at(mv.to).is_some() {
        // The square was occupied already; nothing newly blocked.
        return;
    }
    for dir in KING_DIRS {
        let mut blocked = None;
        for sq in ray_squares(mv.to, dir) {
            if sq == mv.from {
                break;
            }
            if let Some(piece) = overlay.piece_at(sq) {
                if is_slider(piece.kind) && kind_slides_in(piece.kind, dir) {
                    blocked = Some(piece);
                }
                break;
            }
        }
        let Some(slider) = blocked else { continue };

        // What the slider could previously reach beyond the destination.
        let continuation = (-dir.0, -dir.1);
        for sq in ray_squares(mv.to, continuation) {
            if sq == mv.from {
                break;
            }
            let Some(reached) = overlay.piece_at(sq) else {
                continue;
            };
            let slider_sign = slider.color.sign();
            if reached.color != slider.color {
                let est = favorable_exchange(slider.color, sq, overlay, clash);
                if est > 0 {
                    cand.eval.add(-slider_sign * est, 2);
                    if trace {
                        cand.rationale.push(format!(
                            "blocks {:?} line onto {} worth {est}",
                            slider.kind,
                            crate::utils::algebraic::square_to_algebraic(sq)
                        ));
                    }
                }
            } else {
                cand.eval.add(-slider_sign * COVERAGE_VALUE, 2);
            }
            break;
        }
    }
}

/// The two best captures the moved piece newly threatens from its new
/// square. One strong follow-up is worth half, delayed two plies (it is
/// not forcing); a comparably strong second one indicates a fork and is
/// added at a further discount.
fn score_follow_ups(
    cand: &mut MoveCandidate,
    mv: &ChessMove,
    overlay: &Overlay,
    after: &Overlay,
    clash: &mut ClashCache,
    sign: Score,
    trace: bool,
) {
    let old_targets: Vec<Square> = capture_targets(mv.piece, mv.from, overlay)
        .into_iter()
        .map(|(old_mv, _)| old_mv.to)
        .collect();

    let mut gains: HashMap<Square, Score> = HashMap::new();
    for (follow_up, _) in capture_targets(mv.piece_after(), mv.to, after) {
        if old_targets.contains(&follow_up.to) {
            continue;
        }
        let est = favorable_exchange(mv.piece.color, follow_up.to, after, clash);
        if est > 0 {
            let entry = gains.entry(follow_up.to).or_insert(0);
            *entry = (*entry).max(est);
        }
    }

    let mut ranked: Vec<Score> = gains.into_values().collect();
    ranked.sort_unstable_by(|a, b| b.cmp(a));

    if let Some(&best) = ranked.first() {
        cand.eval.add(sign * best / 2, 2);
        if trace {
            cand.rationale.push(format!("threatens follow-up worth {best}"));
        }
        if let Some(&second) = ranked.get(1) {
            if second * FORK_DENOMINATOR >= best * FORK_NUMERATOR {
                cand.eval.add(sign * second / 4, 2);
                if trace {
                    cand.rationale.push(format!("fork, second prong worth {second}"));
                }
            }
        }
    }
}

/// Best own piece the mover newly defends that had no cover at all before.
/// A cover that parries a live threat is worth half the averted loss; an
/// idle cover is worth the flat coverage constant.
fn score_new_cover(
    cand: &mut MoveCandidate,
    mv: &ChessMove,
    overlay: &Overlay,
    after: &Overlay,
    clash: &mut ClashCache,
    sign: Score,
    trace: bool,
) {
    let enemy = mv.piece.color.opposite();
    let old_covers = piece_moves(mv.piece, mv.from, overlay).covers;

    let mut best = 0;
    for covered in piece_moves(mv.piece_after(), mv.to, after).covers {
        if covered == mv.from || old_covers.contains(&covered) {
            continue;
        }
        if !build_clash_mask(mv.piece.color, covered, overlay).is_empty() {
            // Already covered by somebody else before the move.
            continue;
        }
        let averted = favorable_exchange(enemy, covered, overlay, clash);
        let worth = if averted > 0 { averted / 2 } else { COVERAGE_VALUE };
        best = best.max(worth);
    }
    if best > 0 {
        cand.eval.add(sign * best, 2);
        if trace {
            cand.rationale.push(format!("new cover worth {best}"));
        }
    }
}

/// Best capture that was available from the old square but is not from
/// the new one: the opportunity cost of the move.
fn score_lost_captures(
    cand: &mut MoveCandidate,
    mv: &ChessMove,
    overlay: &Overlay,
    after: &Overlay,
    clash: &mut ClashCache,
    sign: Score,
    trace: bool,
) {
    let new_targets: Vec<Square> = capture_targets(mv.piece_after(), mv.to, after)
        .into_iter()
        .map(|(new_mv, _)| new_mv.to)
        .collect();

    let mut best = 0;
    for (old_mv, _) in capture_targets(mv.piece, mv.from, overlay) {
        if old_mv.to == mv.to || new_targets.contains(&old_mv.to) {
            continue;
        }
        let est = favorable_exchange(mv.piece.color, old_mv.to, overlay, clash);
        best = best.max(est);
    }
    if best > 0 {
        cand.eval.add(-sign * best, 2);
        if trace {
            cand.rationale.push(format!("gives up capture worth {best}"));
        }
    }
}

/// The opponent's single best positive capture anywhere except the
/// mover's destination (that exchange is already accounted for).
fn best_enemy_capture_elsewhere(mv: &ChessMove, after: &Overlay, clash: &mut ClashCache) -> Score {
    let enemy = mv.piece.color.opposite();
    let mut best = 0;
    for (sq, piece) in after.squares_of(enemy) {
        for (reply, _) in capture_targets(piece, sq, after) {
            if reply.to == mv.to {
                continue;
            }
            best = best.max(favorable_exchange(enemy, reply.to, after, clash));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::base_position::BasePosition;

    fn evaluate(fen: &str, text: &str) -> Option<MoveCandidate> {
        let base = BasePosition::from_fen(fen).expect("fen should parse");
        let overlay = Overlay::root(&base);
        let mv = ChessMove::from_long_algebraic(text, |sq| overlay.piece_at(sq))
            .expect("move should parse");
        let mut clash = ClashCache::new();
        evaluate_move(mv, &overlay, &mut clash, true)
    }

    #[test]
    fn capturing_a_defended_pawn_shows_the_recapture() {
        // d4 pawn takes c5, which d6 defends.
        let cand = evaluate("8/8/3p4/2p5/3P4/8/8/8 w - - 0 1", "d4c5").expect("legal");
        assert_eq!(cand.eval.slot(0), 100);
        assert_eq!(cand.eval.slot(1), -100);
    }

    #[test]
    fn capturing_hanging_material_is_clean_profit() {
        let cand = evaluate("8/8/2R5/8/8/8/2r5/8 w - - 0 1", "c6c2").expect("legal");
        assert_eq!(cand.eval.slot(0), 500);
        assert_eq!(cand.eval.slot(1), 0);
    }

    #[test]
    fn moving_en_prise_is_penalized_one_ply_out() {
        // Rook steps onto a square a pawn covers.
        let cand = evaluate("8/8/8/3p4/8/3R4/8/8 w - - 0 1", "d3c4").expect("legal");
        assert_eq!(cand.eval.slot(0), 0);
        assert_eq!(cand.eval.slot(1), -500);
    }

    #[test]
    fn knight_fork_scores_both_prongs_with_discounts() {
        let cand = evaluate("2r1r3/8/8/8/4N3/8/8/6K1 w - - 0 1", "e4d6").expect("legal");
        assert_eq!(cand.eval.slot(0), 0);
        // Each rook is defended by the other: 200 per prong, scored as
        // 200/2 + 200/4 two plies out.
        assert_eq!(cand.eval.slot(2), 150);
    }

    #[test]
    fn pinned_piece_move_is_rejected() {
        let result = evaluate("4r3/8/8/8/8/8/4B3/4K3 w - - 0 1", "e2d3");
        assert!(result.is_none());
    }

    #[test]
    fn check_flag_is_set() {
        let cand = evaluate("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1", "a1a8").expect("legal");
        assert!(cand.gives_check);
    }

    #[test]
    fn opponent_reply_is_counted_once() {
        // After the quiet king step, the dark rook can still take the
        // hanging knight on b4.
        let cand = evaluate("8/8/8/8/1N2r3/8/8/4K3 w - - 0 1", "e1d1").expect("legal");
        assert_eq!(cand.eval.slot(0), 0);
        assert_eq!(cand.eval.slot(1), -300);
    }

    #[test]
    fn rationale_is_recorded_only_when_tracing() {
        let base = BasePosition::from_fen("8/8/2R5/8/8/8/2r5/8 w - - 0 1").expect("fen");
        let overlay = Overlay::root(&base);
        let mv = ChessMove::from_long_algebraic("c6c2", |sq| overlay.piece_at(sq)).expect("move");
        let mut clash = ClashCache::new();

        let traced = evaluate_move(mv, &overlay, &mut clash, true).expect("legal");
        assert!(!traced.rationale.is_empty());
        let silent = evaluate_move(mv, &overlay, &mut clash, false).expect("legal");
        assert!(silent.rationale.is_empty());
        // Tracing never changes the evaluation.
        assert_eq!(traced.eval, silent.eval);
    }

    #[test]
    fn en_passant_capture_counts_the_pawn() {
        let base = BasePosition::from_fen("8/8/8/8/2pP4/8/8/8 b - d3 0 1").expect("fen");
        let overlay = Overlay::root(&base);
        let pawn = overlay.piece_at(26).expect("c4 pawn");
        let mv = ChessMove {
            piece: pawn,
            from: 26,
            to: 19,
            kind: MoveKind::EnPassant(27),
        };
        let mut clash = ClashCache::new();
        let cand = evaluate_move(mv, &overlay, &mut clash, false).expect("legal");
        assert_eq!(cand.eval.slot(0), -100, "dark capture counts negative");
    }

    #[test]
    fn blocking_an_own_capture_line_is_an_opportunity_cost() {
        // The a1 rook could win the a7 knight; hopping the c3 knight to
        // a4 closes that file.
        let cand = evaluate("8/n7/8/8/8/2N5/8/R7 w - - 0 1", "c3a4").expect("legal");
        assert_eq!(cand.eval.slot(0), 0);
        assert_eq!(cand.eval.slot(2), -300);
    }
}
