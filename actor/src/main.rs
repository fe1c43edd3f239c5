//! Actor - Self-play driver for the Gomoku MCTS engine
//!
//! A short-lived process that:
//! 1. Loads settings from config.toml, env overrides and CLI flags
//! 2. Plays Black against White, each move chosen by an MCTS search
//! 3. Tallies the results and writes `<data_dir>/actor_stats.json`

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod actor;
mod config;
mod stats;

use crate::actor::Actor;
use crate::config::Config;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    info!(
        "Starting self-play: {} games on a {}x{} board, {} in a row",
        config.games, config.board_size, config.board_size, config.win_length
    );

    let mut actor = Actor::new(config)?;

    match actor.run() {
        Ok(records) => {
            info!(games = records.len(), "Actor completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Actor failed: {}", e);
            Err(e)
        }
    }
}
