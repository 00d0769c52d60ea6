//! Errors used throughout the chess engine.
//!
//! A single error type covers the recoverable failure modes: malformed
//! FEN or algebraic input and move applications that do not match the
//! position they are applied to. Having no legal moves is *not* an error
//! anywhere in this crate — it signals game over and propagates as an
//! empty ranking or `None`. Overlay precondition violations (extending
//! with a move whose mover is not at its claimed origin) are caller bugs
//! and are caught by debug assertions, not represented here.

use thiserror::Error;

/// Unified error type for the chess engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A single character used during algebraic parsing was invalid.
    #[error("invalid algebraic character '{0}'")]
    InvalidAlgebraicChar(char),

    /// An algebraic string (square or move) failed to parse as a whole.
    #[error("invalid algebraic string \"{0}\"")]
    InvalidAlgebraicString(String),

    /// A FEN string was structurally malformed.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// A move referenced a square that holds no piece of the side to move.
    #[error("no movable piece on {0}")]
    NoPieceToMove(String),

    /// A move was rejected by the legality filter.
    #[error("illegal move {0}")]
    IllegalMove(String),
}
