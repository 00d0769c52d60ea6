//! The overlay-search engine: the crate's real playing strength.
//!
//! Wraps the recursive best-move search behind the `Engine` trait and
//! owns the clash resolution cache, which is warm for the whole process
//! lifetime — resolved exchanges depend only on piece composition, so
//! entries stay valid across moves and games.

use log::info;

use crate::board::base_position::BasePosition;
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::search::best_move::{search_root, SearchParams};
use crate::search::clash::ClashCache;

pub struct OverlayEngine {
    params: SearchParams,
    clash: ClashCache,
}

impl OverlayEngine {
    pub fn new(params: SearchParams) -> Self {
        OverlayEngine {
            params,
            clash: ClashCache::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SearchParams::default())
    }
}

impl Default for OverlayEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Engine for OverlayEngine {
    fn new_game(&mut self) {
        // The clash cache survives deliberately: its entries are position
        // independent.
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), String> {
        match name {
            "Depth" | "MaxSearchDepth" => {
                self.params.max_search_depth = value
                    .parse()
                    .map_err(|_| format!("invalid depth value: {value}"))?;
            }
            "TopMoves" | "MaxBestMovesPerPly" => {
                self.params.max_best_moves_per_ply = value
                    .parse()
                    .map_err(|_| format!("invalid top-moves value: {value}"))?;
            }
            "TraceRationale" => {
                self.params.trace_rationale = value.eq_ignore_ascii_case("true");
            }
            _ => {}
        }
        Ok(())
    }

    fn choose_move(
        &mut self,
        position: &BasePosition,
        params: &GoParams,
    ) -> Result<EngineOutput, String> {
        let mut search_params = self.params.clone();
        if let Some(depth) = params.depth {
            search_params.max_search_depth = depth;
        }
        if let Some(nodes) = params.nodes {
            search_params.node_budget = Some(nodes);
        }

        let (ranking, stats) = search_root(position, &search_params, &mut self.clash);
        let mut out = EngineOutput::default();

        match ranking.first() {
            Some(best) => {
                out.info_lines.push(format!(
                    "info depth {} score cp {} nodes {} string eval {}",
                    search_params.max_search_depth,
                    best.eval.weighted_total(),
                    stats.nodes,
                    best.eval,
                ));
                if search_params.trace_rationale && !best.rationale.is_empty() {
                    out.info_lines
                        .push(format!("info string rationale {}", best.rationale.join("; ")));
                }
                info!(
                    "chose {} after {} nodes ({} deep, {} cutoffs)",
                    best.to_long_algebraic(),
                    stats.nodes,
                    stats.deep_searches,
                    stats.cutoffs
                );
                out.best_move = Some(best.to_long_algebraic());
            }
            None => {
                out.info_lines
                    .push("info string no legal moves, game over".to_owned());
            }
        }
        Ok(out)
    }
}
