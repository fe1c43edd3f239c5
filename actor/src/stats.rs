//! Self-play statistics tracking and persistence.
//!
//! This module tallies finished games (wins per colour, draws, game length)
//! and the MCTS work spent on them. Stats are written to a JSON file so a run
//! can be inspected after the fact.

use games_gomoku::{Colour, Outcome};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Aggregated self-play statistics, designed for lock-free updates.
#[derive(Debug)]
pub struct ActorStats {
    /// Number of games completed
    games_completed: AtomicU32,
    /// Total moves across all games
    total_plies: AtomicU64,
    /// Games won by Black
    black_wins: AtomicU32,
    /// Games won by White
    white_wins: AtomicU32,
    /// Games that filled the board without a line
    draws: AtomicU32,
    /// Start time for rate calculations
    start_time: Instant,
    /// Path to write stats file
    stats_path: PathBuf,
    /// Board geometry, for the snapshot header
    board_size: usize,
    win_length: usize,
    /// MCTS stats: total searches performed
    searches: AtomicU64,
    /// MCTS stats: total simulations run
    simulations: AtomicU64,
    /// MCTS stats: total search wall time (microseconds)
    search_time_us: AtomicU64,
}

/// Serializable stats for JSON output.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActorStatsSnapshot {
    pub board_size: usize,
    pub win_length: usize,
    pub games_completed: u32,
    pub total_plies: u64,
    pub black_wins: u32,
    pub white_wins: u32,
    pub draws: u32,
    pub avg_game_length: f64,
    pub games_per_second: f64,
    pub runtime_seconds: f64,
    pub avg_simulations_per_search: f64,
    pub avg_search_time_us: f64,
    pub timestamp: u64,
}

impl ActorStats {
    /// Create new stats tracker writing to `<data_dir>/actor_stats.json`.
    pub fn new(data_dir: impl AsRef<Path>, board_size: usize, win_length: usize) -> Self {
        let data_dir = data_dir.as_ref();
        let stats_path = data_dir.join("actor_stats.json");

        // Ensure data directory exists
        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create data directory: {}", e);
        }

        Self {
            games_completed: AtomicU32::new(0),
            total_plies: AtomicU64::new(0),
            black_wins: AtomicU32::new(0),
            white_wins: AtomicU32::new(0),
            draws: AtomicU32::new(0),
            start_time: Instant::now(),
            stats_path,
            board_size,
            win_length,
            searches: AtomicU64::new(0),
            simulations: AtomicU64::new(0),
            search_time_us: AtomicU64::new(0),
        }
    }

    /// Record a completed game.
    pub fn record_game(&self, plies: u32, outcome: Outcome) {
        self.games_completed.fetch_add(1, Ordering::Relaxed);
        self.total_plies.fetch_add(plies as u64, Ordering::Relaxed);

        let counter = match outcome {
            Outcome::Won(Colour::Black) => &self.black_wins,
            Outcome::Won(Colour::White) => &self.white_wins,
            Outcome::Draw => &self.draws,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record MCTS work for a game.
    pub fn record_searches(&self, searches: u32, simulations: u64, search_time: Duration) {
        self.searches.fetch_add(searches as u64, Ordering::Relaxed);
        self.simulations.fetch_add(simulations, Ordering::Relaxed);
        self.search_time_us
            .fetch_add(search_time.as_micros() as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> ActorStatsSnapshot {
        let games = self.games_completed.load(Ordering::Relaxed);
        let total_plies = self.total_plies.load(Ordering::Relaxed);
        let runtime = self.start_time.elapsed().as_secs_f64();
        let searches = self.searches.load(Ordering::Relaxed);
        let simulations = self.simulations.load(Ordering::Relaxed);
        let search_time_us = self.search_time_us.load(Ordering::Relaxed);

        let avg_game_length = if games > 0 {
            total_plies as f64 / games as f64
        } else {
            0.0
        };

        let games_per_second = if runtime > 0.0 {
            games as f64 / runtime
        } else {
            0.0
        };

        let (avg_simulations_per_search, avg_search_time_us) = if searches > 0 {
            (
                simulations as f64 / searches as f64,
                search_time_us as f64 / searches as f64,
            )
        } else {
            (0.0, 0.0)
        };

        ActorStatsSnapshot {
            board_size: self.board_size,
            win_length: self.win_length,
            games_completed: games,
            total_plies,
            black_wins: self.black_wins.load(Ordering::Relaxed),
            white_wins: self.white_wins.load(Ordering::Relaxed),
            draws: self.draws.load(Ordering::Relaxed),
            avg_game_length,
            games_per_second,
            runtime_seconds: runtime,
            avg_simulations_per_search,
            avg_search_time_us,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write stats to JSON file (atomic write-then-rename).
    pub fn write_stats(&self) {
        let snapshot = self.snapshot();

        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize actor stats: {}", e);
                return;
            }
        };

        // Write to temp file then rename (atomic on most filesystems)
        let temp_path = self.stats_path.with_extension("json.tmp");
        match fs::File::create(&temp_path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(json.as_bytes()) {
                    warn!("Failed to write actor stats: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to create temp stats file: {}", e);
                return;
            }
        }

        if let Err(e) = fs::rename(&temp_path, &self.stats_path) {
            warn!("Failed to rename stats file: {}", e);
            let _ = fs::remove_file(&temp_path);
            return;
        }

        debug!("Wrote actor stats to {}", self.stats_path.display());
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }
}
