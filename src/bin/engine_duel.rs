//! Standalone engine-vs-engine duel runner.
//!
//! Plays the overlay search engine against the random baseline from the
//! starting position and prints the move list. Run with:
//! `cargo run --release --bin engine_duel`
//! `cargo run --release --bin engine_duel -- --depth 4 --plies 80`

use quince_chess::board::base_position::BasePosition;
use quince_chess::board::chess_move::ChessMove;
use quince_chess::engines::engine_overlay::OverlayEngine;
use quince_chess::engines::engine_random::RandomEngine;
use quince_chess::engines::engine_trait::{Engine, GoParams};
use quince_chess::search::best_move::SearchParams;
use quince_chess::utils::render_position::render_position;

fn main() -> Result<(), String> {
    env_logger::init();

    let mut depth: u8 = 3;
    let mut max_plies: u32 = 60;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--depth" => {
                depth = args
                    .next()
                    .and_then(|v| v.parse().ok())
                    .ok_or("--depth needs a number")?;
            }
            "--plies" => {
                max_plies = args
                    .next()
                    .and_then(|v| v.parse().ok())
                    .ok_or("--plies needs a number")?;
            }
            other => return Err(format!("unknown argument {other}")),
        }
    }

    println!(
        "engine duel started {} (overlay depth {depth} vs random, max {max_plies} plies)",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let mut overlay_engine = OverlayEngine::new(SearchParams {
        max_search_depth: depth,
        ..SearchParams::default()
    });
    let mut random_engine = RandomEngine::new();

    let mut position = BasePosition::new_game();
    let go = GoParams::default();
    let mut moves_played = Vec::new();

    for ply in 0..max_plies {
        let output = if ply % 2 == 0 {
            overlay_engine.choose_move(&position, &go)?
        } else {
            random_engine.choose_move(&position, &go)?
        };

        let Some(text) = output.best_move else {
            println!("game over after {ply} plies");
            break;
        };
        let mv = ChessMove::from_long_algebraic(&text, |sq| position.piece_at(sq))
            .map_err(|e| e.to_string())?;
        position = position.play(&mv);
        moves_played.push(text);
    }

    println!("moves: {}", moves_played.join(" "));
    println!("{}", render_position(&position));
    println!("final fen: {}", position.get_fen());
    Ok(())
}
