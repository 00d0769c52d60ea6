//! UCI binary entry point.
//!
//! Logging goes to stderr via `env_logger` (RUST_LOG=debug for search
//! statistics); stdout carries only protocol output.

use quince_chess::uci::uci_top::run_stdio_loop;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(error) = run_stdio_loop() {
        eprintln!("fatal io error: {error}");
        std::process::exit(1);
    }
}
