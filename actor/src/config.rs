//! Configuration for the self-play actor
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use games_gomoku::Rules;
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_board_size() -> usize {
    CENTRAL_CONFIG.game.board_size
}

fn default_win_length() -> usize {
    CENTRAL_CONFIG.game.win_length
}

fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_exploration_constant() -> f64 {
    CENTRAL_CONFIG.mcts.exploration_constant
}

fn default_time_limit_ms() -> u64 {
    CENTRAL_CONFIG.mcts.time_limit_ms
}

fn default_games() -> u32 {
    CENTRAL_CONFIG.selfplay.games
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.selfplay.seed
}

fn default_log_interval() -> u32 {
    CENTRAL_CONFIG.selfplay.log_interval
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "actor")]
#[command(about = "Gomoku self-play driver for the MCTS engine")]
#[command(
    long_about = "Plays Black against White, both sides searched with MCTS and random
rollouts, and tallies the results into <data-dir>/actor_stats.json.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Directory for the stats snapshot
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Number of self-play games to run
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Seed for the rollout RNG
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Log progress every N games (0 to disable)
    #[arg(long, default_value_t = default_log_interval())]
    pub log_interval: u32,

    /// Side length of the square board
    #[arg(long, default_value_t = default_board_size())]
    pub board_size: usize,

    /// Stones in a row needed to win
    #[arg(long, default_value_t = default_win_length())]
    pub win_length: usize,

    /// Number of MCTS simulations per move
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    /// UCT exploration constant
    #[arg(long, default_value_t = default_exploration_constant())]
    pub exploration_constant: f64,

    /// Wall-clock limit per move in milliseconds (0 for none)
    #[arg(long, default_value_t = default_time_limit_ms())]
    pub time_limit_ms: u64,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        if self.num_simulations == 0 {
            return Err(anyhow!("num_simulations must be greater than 0"));
        }

        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(anyhow!(
                "exploration_constant must be a finite non-negative number, got {}",
                self.exploration_constant
            ));
        }

        if self.data_dir.is_empty() {
            return Err(anyhow!("data_dir cannot be empty"));
        }

        self.rules()?;

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Board geometry for every game.
    pub fn rules(&self) -> Result<Rules> {
        Ok(Rules::new(self.board_size, self.win_length)?)
    }

    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }

    /// Search parameters used for every move.
    pub fn mcts_config(&self) -> MctsConfig {
        let config = MctsConfig::default()
            .with_simulations(self.num_simulations)
            .with_exploration(self.exploration_constant);

        match self.time_limit() {
            Some(limit) => config.with_time_limit(limit),
            None => config,
        }
    }
}
