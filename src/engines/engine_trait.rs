//! Engine abstraction layer used by the UCI subsystem.
//!
//! Defines common input parameters and output payloads so different engine
//! strategies can be selected at runtime behind a single trait interface.

use crate::board::base_position::BasePosition;

#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub depth: Option<u8>,
    pub movetime_ms: Option<u64>,
    pub nodes: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Chosen move in long algebraic notation; `None` means game over.
    pub best_move: Option<String>,
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn new_game(&mut self) {}
    fn set_option(&mut self, _name: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    fn choose_move(
        &mut self,
        position: &BasePosition,
        params: &GoParams,
    ) -> Result<EngineOutput, String>;
}
