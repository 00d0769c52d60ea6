//! Uniform random move chooser, the baseline opponent for harness runs.

use rand::prelude::IndexedRandom;

use crate::board::base_position::BasePosition;
use crate::board::move_generation::legal_moves_of_side;
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::search::overlay::Overlay;

#[derive(Debug, Default)]
pub struct RandomEngine;

impl RandomEngine {
    pub fn new() -> Self {
        RandomEngine
    }
}

impl Engine for RandomEngine {
    fn choose_move(
        &mut self,
        position: &BasePosition,
        _params: &GoParams,
    ) -> Result<EngineOutput, String> {
        let overlay = Overlay::root(position);
        let moves = legal_moves_of_side(&overlay, position.side_to_move);

        let mut rng = rand::rng();
        let mut out = EngineOutput::default();
        out.best_move = moves.choose(&mut rng).map(|mv| mv.to_long_algebraic());
        if out.best_move.is_none() {
            out.info_lines
                .push("info string no legal moves, game over".to_owned());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_some_legal_move() {
        let mut engine = RandomEngine::new();
        let base = BasePosition::new_game();
        let out = engine
            .choose_move(&base, &GoParams::default())
            .expect("choice should run");
        let text = out.best_move.expect("startpos has moves");
        assert!(text.len() >= 4);
    }

    #[test]
    fn returns_none_when_the_game_is_over() {
        let mut engine = RandomEngine::new();
        let base = BasePosition::from_fen("R6k/8/6K1/8/8/8/8/8 b - - 0 1").expect("fen");
        let out = engine
            .choose_move(&base, &GoParams::default())
            .expect("choice should run");
        assert!(out.best_move.is_none());
    }
}
