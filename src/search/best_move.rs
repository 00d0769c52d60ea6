//! Recursive best-move search with alpha-beta pruning.
//!
//! Each node runs two asymmetric passes over the candidate moves of the
//! side to move. Pre-evaluation scores every legal move heuristically and
//! keeps the best in a ranker with head-room; the selective deep pass
//! then re-verifies only the candidates worth a recursion, folding the
//! opponent's best reply back into each candidate's vector. The
//! alpha/beta window is board-absolute: Light raises alpha, Dark lowers
//! beta, and a node stops examining moves once its best candidate's
//! immediate score exhausts the window. Pruning decides which moves get
//! verified, never whether a move is returned — even a cut node hands
//! back a complete (partially heuristic) ranking.

use log::debug;

use crate::board::base_position::BasePosition;
use crate::board::chess_types::{
    Color, Piece, Score, Square, KING_VALUE, KNIGHT_VALUE, PAWN_VALUE, SURE_CHECKMATE,
};
use crate::board::move_generation::piece_moves;
use crate::search::clash::{is_in_check, ClashCache};
use crate::search::eval_vector::EvalVector;
use crate::search::move_candidate::MoveCandidate;
use crate::search::move_heuristics::{evaluate_move, immediate_material_gain};
use crate::search::overlay::Overlay;
use crate::search::ranking::insert_ranked;

/// Wider than any reachable score; the initial alpha/beta window.
pub const AB_INF: Score = 32_000;

/// Search configuration, passed explicitly into every search call.
/// Verbose tracing is a field here rather than a process-wide flag.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Plies of deep recursion below the root.
    pub max_search_depth: u8,
    /// Bound of the per-node candidate ranking (top-K width).
    pub max_best_moves_per_ply: usize,
    /// Optional node budget; an exhausted node degrades to its
    /// pre-evaluated ranking instead of failing.
    pub node_budget: Option<u64>,
    /// Record a free-text rationale trail on every candidate.
    pub trace_rationale: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            max_search_depth: 8,
            max_best_moves_per_ply: 8,
            node_budget: None,
            trace_rationale: false,
        }
    }
}

/// Counters for one search invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    pub nodes: u64,
    pub pre_evaluations: u64,
    pub deep_searches: u64,
    pub cutoffs: u64,
}

struct SearchContext<'p> {
    params: &'p SearchParams,
    clash: &'p mut ClashCache,
    stats: SearchStats,
}

/// Mate found after `depth` plies; nearer mates score higher. Never
/// drops below the sure-checkmate threshold.
#[inline]
fn mate_score(depth: u8) -> Score {
    (KING_VALUE - 50 * depth as Score).max(SURE_CHECKMATE)
}

/// Whether a pre-evaluated candidate is interesting enough to warrant
/// recursion: material swings always, everything at the root, and at
/// shallow depths moves whose anticipated plies clear escalating bars.
fn warrants_deep_search(cand: &MoveCandidate, depth: u8) -> bool {
    if depth == 0 {
        return true;
    }
    if cand.eval.slot(0).abs() >= KNIGHT_VALUE {
        return true;
    }
    match depth {
        1 | 2 => {
            cand.eval.slot(1).abs() >= PAWN_VALUE
                || cand.eval.slot(2).abs() >= PAWN_VALUE + PAWN_VALUE / 2
        }
        3 | 4 => cand.eval.slot(1).abs() >= KNIGHT_VALUE,
        _ => false,
    }
}

/// One recursive node. Returns the full ranking for `color`, best first;
/// empty means `color` has no legal move (game over at this node).
fn search_node(
    overlay: &Overlay,
    color: Color,
    depth: u8,
    mut alpha: Score,
    mut beta: Score,
    ctx: &mut SearchContext,
) -> Vec<MoveCandidate> {
    ctx.stats.nodes += 1;

    let max_top = ctx.params.max_best_moves_per_ply.max(1);
    let headroom = max_top + max_top / 2;
    let budget_spent = ctx
        .params
        .node_budget
        .is_some_and(|budget| ctx.stats.nodes > budget);
    let at_horizon = depth >= ctx.params.max_search_depth || budget_spent;

    // Phase A: pre-evaluate every legal move into the head-room ranker.
    let mut top: Vec<MoveCandidate> = Vec::with_capacity(headroom + 1);
    let mut rest: Vec<MoveCandidate> = Vec::new();
    let mut found_mate = false;

    let pieces: Vec<(Square, Piece)> = overlay.squares_of(color).collect();
    'pre_evaluation: for (sq, piece) in pieces {
        for mv in piece_moves(piece, sq, overlay).playable {
            let Some(cand) = evaluate_move(mv, overlay, ctx.clash, ctx.params.trace_rationale)
            else {
                continue;
            };
            ctx.stats.pre_evaluations += 1;
            insert_ranked(cand, &mut top, color, headroom, &mut rest);

            let best_now = top[0].eval.slot(0);
            found_mate = best_now.abs() >= SURE_CHECKMATE;
            if at_horizon || found_mate {
                match color {
                    Color::Light => {
                        alpha = alpha.max(best_now);
                        if best_now >= beta {
                            ctx.stats.cutoffs += 1;
                            break 'pre_evaluation;
                        }
                    }
                    Color::Dark => {
                        beta = beta.min(best_now);
                        if best_now <= alpha {
                            ctx.stats.cutoffs += 1;
                            break 'pre_evaluation;
                        }
                    }
                }
            }
        }
    }

    // Phase B: terminal checks.
    if top.is_empty() {
        return Vec::new();
    }
    if at_horizon || found_mate {
        top.extend(rest);
        return top;
    }

    // Phase C: selective deep verification into the final, tighter ranker.
    let mut final_top: Vec<MoveCandidate> = Vec::with_capacity(max_top + 1);
    let mut final_rest: Vec<MoveCandidate> = Vec::new();
    let mut cut = false;

    for cand in top {
        if cut || !warrants_deep_search(&cand, depth) {
            insert_ranked(cand, &mut final_top, color, max_top, &mut final_rest);
            continue;
        }

        ctx.stats.deep_searches += 1;
        let carried = color.sign() * immediate_material_gain(&cand.mv, overlay);
        let extended = overlay.extend(cand.mv);
        let replies = search_node(&extended, color.opposite(), depth + 1, alpha, beta, ctx);

        let mut verified = cand;
        match replies.first() {
            Some(best_reply) => {
                // Replace the heuristic estimate with the verified line:
                // the opponent's best reply one ply later, plus the
                // capture value this move banks immediately.
                let mut folded = best_reply.eval;
                folded.time_shift(1);
                folded.add(carried, 0);
                verified.eval = folded;
            }
            None => {
                if is_in_check(color.opposite(), &extended) {
                    verified.eval = EvalVector::immediate(color.sign() * mate_score(depth));
                    if ctx.params.trace_rationale {
                        verified.rationale.push("checkmate".to_owned());
                    }
                } else if extended.piece_count(color.opposite()) > 0 {
                    // Stalemate: a dead draw no matter the material.
                    verified.eval = EvalVector::zero();
                } else {
                    // Bare study board with nothing left to move; keep the
                    // heuristic estimate rather than calling it a draw.
                }
            }
        }

        insert_ranked(verified, &mut final_top, color, max_top, &mut final_rest);
        let best_now = final_top[0].eval.slot(0);
        match color {
            Color::Light => {
                alpha = alpha.max(best_now);
                if best_now >= beta {
                    ctx.stats.cutoffs += 1;
                    cut = true;
                }
            }
            Color::Dark => {
                beta = beta.min(best_now);
                if best_now <= alpha {
                    ctx.stats.cutoffs += 1;
                    cut = true;
                }
            }
        }
    }

    // Phase D: the full ranking, best first, pruned tail appended.
    final_top.extend(final_rest);
    final_top.extend(rest);
    final_top
}

/// Run a full search from `base` and return the root ranking together
/// with the collected statistics. The clash cache persists across calls
/// when the caller keeps it.
pub fn search_root(
    base: &BasePosition,
    params: &SearchParams,
    clash: &mut ClashCache,
) -> (Vec<MoveCandidate>, SearchStats) {
    let overlay = Overlay::root(base);
    let color = overlay.turn_color();
    let mut ctx = SearchContext {
        params,
        clash,
        stats: SearchStats::default(),
    };
    let ranking = search_node(&overlay, color, 0, -AB_INF, AB_INF, &mut ctx);
    let (clash_hits, clash_misses) = ctx.clash.hit_rate();
    debug!(
        "search: {} nodes, {} pre-evaluations, {} deep, {} cutoffs, clash cache {} ({clash_hits} hits / {clash_misses} misses)",
        ctx.stats.nodes,
        ctx.stats.pre_evaluations,
        ctx.stats.deep_searches,
        ctx.stats.cutoffs,
        ctx.clash.len(),
    );
    (ranking, ctx.stats)
}

/// The engine's chosen move for `base`, or `None` when the side to move
/// has no legal move.
pub fn best_move(base: &BasePosition, params: &SearchParams) -> Option<MoveCandidate> {
    let mut clash = ClashCache::new();
    let (ranking, _) = search_root(base, params, &mut clash);
    ranking.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shallow() -> SearchParams {
        SearchParams {
            max_search_depth: 3,
            ..SearchParams::default()
        }
    }

    fn chosen(fen: &str, params: &SearchParams) -> Option<String> {
        let base = BasePosition::from_fen(fen).expect("fen should parse");
        best_move(&base, params).map(|cand| cand.to_long_algebraic())
    }

    #[test]
    fn light_rook_takes_the_hanging_rook() {
        assert_eq!(
            chosen("8/8/2R5/8/8/8/2r5/8 w - - 0 1", &shallow()),
            Some("c6c2".to_owned())
        );
    }

    #[test]
    fn dark_rook_takes_the_hanging_rook() {
        assert_eq!(
            chosen("8/8/2R5/8/8/8/2r5/8 b - - 0 1", &shallow()),
            Some("c2c6".to_owned())
        );
    }

    #[test]
    fn prefers_the_undefended_rook_over_the_defended_one() {
        assert_eq!(
            chosen("8/5k2/2R3r1/3K4/8/8/6R1/8 b - - 0 1", &shallow()),
            Some("g6g2".to_owned())
        );
    }

    #[test]
    fn promotes_to_a_queen() {
        assert_eq!(
            chosen("8/P7/8/8/8/8/p7/8 w - - 0 1", &shallow()),
            Some("a7a8q".to_owned())
        );
    }

    #[test]
    fn the_single_legal_move_delivers_mate() {
        // Light is in check and has exactly one reply, which happens to
        // be checkmate; the empty opponent ranking below it must score as
        // mate, not as an error.
        let base =
            BasePosition::from_fen("8/8/1b3p2/5P1k/5P2/5PRq/8/7K w - - 0 1").expect("fen");
        let cand = best_move(&base, &shallow()).expect("the mating move exists");
        assert_eq!(cand.to_long_algebraic(), "g3h3");
        assert!(cand.eval.slot(0) >= SURE_CHECKMATE);
    }

    #[test]
    fn no_legal_moves_yields_none_not_a_failure() {
        // Stalemate: dark king in the corner, nothing may move.
        let base = BasePosition::from_fen("7k/5K2/6Q1/8/8/8/8/8 b - - 0 1").expect("fen");
        assert!(best_move(&base, &shallow()).is_none());
    }

    #[test]
    fn checkmated_side_has_empty_ranking() {
        // Corner mate: the a8 rook covers the back rank, the king g7/h7.
        let base = BasePosition::from_fen("R6k/8/6K1/8/8/8/8/8 b - - 0 1").expect("fen");
        assert!(best_move(&base, &shallow()).is_none());
    }

    #[test]
    fn node_budget_degrades_gracefully() {
        let base = BasePosition::new_game();
        let params = SearchParams {
            max_search_depth: 4,
            node_budget: Some(5),
            ..SearchParams::default()
        };
        // Best-so-far, never "no move".
        assert!(best_move(&base, &params).is_some());
    }

    #[test]
    fn ranking_contains_every_legal_move() {
        let base = BasePosition::new_game();
        let params = SearchParams {
            max_search_depth: 1,
            ..SearchParams::default()
        };
        let mut clash = ClashCache::new();
        let (ranking, stats) = search_root(&base, &params, &mut clash);
        assert_eq!(ranking.len(), 20, "pruning must not drop moves");
        assert!(stats.nodes >= 1);
        assert!(stats.pre_evaluations >= 20);
    }

    #[test]
    fn deeper_search_still_finds_the_capture() {
        let params = SearchParams {
            max_search_depth: 5,
            ..SearchParams::default()
        };
        assert_eq!(
            chosen("8/8/2R5/8/8/8/2r5/8 w - - 0 1", &params),
            Some("c6c2".to_owned())
        );
    }
}
