//! Crate root module declarations for the Quince Chess engine project.
//!
//! This file exposes all top-level subsystems (board model, overlay-based
//! search, engines, UCI protocol handling, and utility helpers) so binaries,
//! tests, and external tooling can import stable module paths.

pub mod errors;

pub mod board {
    pub mod base_position;
    pub mod chess_move;
    pub mod chess_types;
    pub mod move_generation;
    pub mod piece_geometry;
}

pub mod search {
    pub mod best_move;
    pub mod clash;
    pub mod eval_vector;
    pub mod move_candidate;
    pub mod move_heuristics;
    pub mod overlay;
    pub mod ranking;
}

pub mod engines {
    pub mod engine_overlay;
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod uci {
    pub mod uci_top;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod render_position;
}
