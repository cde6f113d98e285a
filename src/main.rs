//! AbilityChess - Console front end
//!
//! Usage:
//!     ability_chess [config.json]
//!
//! Reads commands from stdin and writes replies to stdout. Diagnostics go to
//! stderr, filtered by `RUST_LOG` (default `warn`).

use ability_chess::console::Console;
use ability_chess::GameConfig;
use std::io;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(text) => match GameConfig::from_json(&text) {
                Ok(config) => config,
                Err(e) => {
                    error!("{}: {}", path, e);
                    return ExitCode::FAILURE;
                }
            },
            Err(e) => {
                error!("Cannot read {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    let mut console = Console::stdout(config);
    console.run(io::stdin().lock());
    ExitCode::SUCCESS
}
