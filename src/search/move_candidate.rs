//! A candidate move with its attached evaluation.
//!
//! Candidates are created during move generation, their vectors augmented
//! during evaluation and deep search, and all but the chosen one are
//! discarded when a ply completes. Identity stays structural on the
//! underlying move — the evaluation is never part of it.

use crate::search::eval_vector::EvalVector;

use crate::board::chess_move::ChessMove;

/// A move under consideration by the search.
#[derive(Debug, Clone)]
pub struct MoveCandidate {
    pub mv: ChessMove,
    /// Whether the move puts the opponent's king in check.
    pub gives_check: bool,
    pub eval: EvalVector,
    /// Free-text evaluation trail, recorded only when tracing is enabled
    /// in the search parameters. Diagnostic only.
    pub rationale: Vec<String>,
}

impl MoveCandidate {
    pub fn new(mv: ChessMove) -> Self {
        MoveCandidate {
            mv,
            gives_check: false,
            eval: EvalVector::zero(),
            rationale: Vec::new(),
        }
    }

    /// Long-algebraic coordinate rendering of the underlying move.
    pub fn to_long_algebraic(&self) -> String {
        self.mv.to_long_algebraic()
    }
}

impl PartialEq for MoveCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.mv == other.mv
    }
}

impl Eq for MoveCandidate {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::chess_types::{Color, Piece, PieceKind};

    #[test]
    fn identity_ignores_evaluation() {
        let mv = ChessMove::regular(Piece::new(Color::Light, PieceKind::Rook), 42, 10);
        let plain = MoveCandidate::new(mv);
        let mut scored = MoveCandidate::new(mv);
        scored.eval.add(500, 0);
        scored.gives_check = true;
        assert_eq!(plain, scored);
    }
}
