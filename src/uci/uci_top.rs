//! UCI protocol front-end and command loop.
//!
//! Parses UCI commands, maintains the current position, routes `go`
//! requests to the selected engine, and emits protocol-compliant output.
//! The search itself is synchronous; `go` returns when the move is found.

use std::io::{self, BufRead, Write};

use log::warn;

use crate::board::base_position::BasePosition;
use crate::board::chess_move::ChessMove;
use crate::board::move_generation::legal_moves_of_side;
use crate::engines::engine_overlay::OverlayEngine;
use crate::engines::engine_random::RandomEngine;
use crate::engines::engine_trait::{Engine, GoParams};
use crate::errors::EngineError;
use crate::search::overlay::Overlay;

const UCI_ENGINE_NAME: &str = "Quince Chess";
const UCI_ENGINE_AUTHOR: &str = "quince_chess developers";

pub fn run_stdio_loop() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut uci = UciState::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = uci.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

struct UciState {
    position: BasePosition,
    engine: Box<dyn Engine>,
    debug_mode: bool,
}

impl UciState {
    fn new() -> Self {
        UciState {
            position: BasePosition::new_game(),
            engine: Box::new(OverlayEngine::with_defaults()),
            debug_mode: false,
        }
    }

    fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        let mut tokens = trimmed.split_whitespace();
        let command = tokens.next().unwrap_or_default();
        let rest: Vec<&str> = tokens.collect();

        match command {
            "uci" => {
                writeln!(out, "id name {UCI_ENGINE_NAME}")?;
                writeln!(out, "id author {UCI_ENGINE_AUTHOR}")?;
                writeln!(out, "option name Depth type spin default 8 min 1 max 15")?;
                writeln!(out, "option name TopMoves type spin default 8 min 1 max 32")?;
                writeln!(out, "option name Engine type combo default overlay var overlay var random")?;
                writeln!(out, "uciok")?;
            }
            "debug" => {
                self.debug_mode = rest.first() == Some(&"on");
            }
            "isready" => {
                writeln!(out, "readyok")?;
            }
            "ucinewgame" => {
                self.position = BasePosition::new_game();
                self.engine.new_game();
            }
            "setoption" => {
                self.handle_setoption(&rest);
            }
            "position" => {
                if let Err(reason) = self.handle_position(&rest) {
                    warn!("position command rejected: {reason}");
                }
            }
            "go" => {
                self.handle_go(&rest, out)?;
            }
            "stop" => {
                // Search is synchronous; nothing is in flight to stop.
            }
            "quit" => return Ok(true),
            _ => {
                if self.debug_mode {
                    writeln!(out, "info string unknown command {command}")?;
                }
            }
        }
        Ok(false)
    }

    fn handle_setoption(&mut self, rest: &[&str]) {
        // Form: setoption name <Name> value <Value>
        let name_idx = rest.iter().position(|&t| t == "name");
        let value_idx = rest.iter().position(|&t| t == "value");
        let (Some(name_idx), Some(value_idx)) = (name_idx, value_idx) else {
            return;
        };
        if value_idx <= name_idx {
            return;
        }
        let name = rest[name_idx + 1..value_idx].join(" ");
        let value = rest[value_idx + 1..].join(" ");

        if name == "Engine" {
            self.engine = match value.as_str() {
                "random" => Box::new(RandomEngine::new()),
                _ => Box::new(OverlayEngine::with_defaults()),
            };
            return;
        }
        if let Err(reason) = self.engine.set_option(&name, &value) {
            warn!("setoption rejected: {reason}");
        }
    }

    fn handle_position(&mut self, rest: &[&str]) -> Result<(), String> {
        let mut idx = 0;
        let mut position = match rest.first() {
            Some(&"startpos") => {
                idx = 1;
                BasePosition::new_game()
            }
            Some(&"fen") => {
                let moves_at = rest.iter().position(|&t| t == "moves").unwrap_or(rest.len());
                let fen = rest[1..moves_at].join(" ");
                idx = moves_at;
                BasePosition::from_fen(&fen).map_err(|e| e.to_string())?
            }
            _ => return Err("expected startpos or fen".to_owned()),
        };

        if rest.get(idx) == Some(&"moves") {
            for text in &rest[idx + 1..] {
                let mv = ChessMove::from_long_algebraic(text, |sq| position.piece_at(sq))
                    .map_err(|e| e.to_string())?;
                let overlay = Overlay::root(&position);
                if !legal_moves_of_side(&overlay, position.side_to_move).contains(&mv) {
                    return Err(EngineError::IllegalMove((*text).to_owned()).to_string());
                }
                drop(overlay);
                position = position.play(&mv);
            }
        }

        self.position = position;
        Ok(())
    }

    fn handle_go(&mut self, rest: &[&str], out: &mut impl Write) -> io::Result<()> {
        let mut params = GoParams::default();
        let mut iter = rest.iter();
        while let Some(&token) = iter.next() {
            match token {
                "depth" => params.depth = iter.next().and_then(|v| v.parse().ok()),
                "movetime" => params.movetime_ms = iter.next().and_then(|v| v.parse().ok()),
                "nodes" => params.nodes = iter.next().and_then(|v| v.parse().ok()),
                _ => {}
            }
        }

        match self.engine.choose_move(&self.position, &params) {
            Ok(output) => {
                for info in &output.info_lines {
                    writeln!(out, "{info}")?;
                }
                match output.best_move {
                    Some(text) => writeln!(out, "bestmove {text}")?,
                    None => writeln!(out, "bestmove 0000")?,
                }
            }
            Err(reason) => {
                writeln!(out, "info string search failed: {reason}")?;
                writeln!(out, "bestmove 0000")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_commands(commands: &[&str]) -> String {
        let mut uci = UciState::new();
        let mut out = Vec::new();
        for command in commands {
            let quit = uci.handle_command(command, &mut out).expect("io on Vec");
            if quit {
                break;
            }
        }
        String::from_utf8(out).expect("valid utf8")
    }

    #[test]
    fn identifies_itself() {
        let output = run_commands(&["uci", "isready"]);
        assert!(output.contains("id name Quince Chess"));
        assert!(output.contains("uciok"));
        assert!(output.contains("readyok"));
    }

    #[test]
    fn plays_a_capture_from_a_fen_position() {
        let output = run_commands(&[
            "position fen 8/8/2R5/8/8/8/2r5/8 w - - 0 1",
            "go depth 3",
        ]);
        assert!(output.contains("bestmove c6c2"), "got: {output}");
    }

    #[test]
    fn replays_moves_after_startpos() {
        let mut uci = UciState::new();
        let mut out = Vec::new();
        uci.handle_command("position startpos moves e2e4 e7e5", &mut out)
            .expect("io on Vec");
        assert_eq!(
            uci.position.get_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
        );
    }

    #[test]
    fn rejects_illegal_replayed_moves() {
        let mut uci = UciState::new();
        let mut out = Vec::new();
        uci.handle_command("position startpos moves e2e5", &mut out)
            .expect("io on Vec");
        // The illegal move is refused and the position stays put.
        assert_eq!(uci.position.get_fen(), BasePosition::new_game().get_fen());
    }

    #[test]
    fn reports_null_move_when_mated() {
        let output = run_commands(&[
            "position fen R6k/8/6K1/8/8/8/8/8 b - - 0 1",
            "go depth 2",
        ]);
        assert!(output.contains("bestmove 0000"));
    }
}
