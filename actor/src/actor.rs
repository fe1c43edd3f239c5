//! Self-play loop: both colours search with MCTS and random rollouts.

use anyhow::Result;
use games_gomoku::{Action, Board, Colour, GameState, Outcome, Rules};
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{run_mcts, MctsConfig, SearchStats};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::stats::ActorStats;

/// Aggregated MCTS stats for one game.
#[derive(Debug, Default)]
struct GameSearchStats {
    /// Number of MCTS searches performed (one per move)
    search_count: u32,
    /// Counters summed over every search; `max_depth` is the deepest tree seen
    totals: SearchStats,
}

impl GameSearchStats {
    /// Add stats from a single MCTS search.
    fn add(&mut self, stats: &SearchStats) {
        self.search_count += 1;

        let totals = &mut self.totals;
        totals.simulations += stats.simulations;
        totals.total_time += stats.total_time;
        totals.select_time += stats.select_time;
        totals.rollout_time += stats.rollout_time;
        totals.backprop_time += stats.backprop_time;
        totals.rollout_plies += stats.rollout_plies;
        totals.terminal_hits += stats.terminal_hits;
        totals.max_depth = totals.max_depth.max(stats.max_depth);
    }

    /// Log a summary of the game's search stats.
    fn log_summary(&self, game_num: u32) {
        let totals = &self.totals;
        if self.search_count == 0 || totals.total_time.is_zero() {
            return;
        }

        let total = totals.total_time.as_secs_f64();
        let pct = |part: Duration| part.as_secs_f64() / total * 100.0;

        info!(
            game = game_num,
            searches = self.search_count,
            simulations = totals.simulations,
            total_ms = format!("{:.1}", total * 1000.0),
            select_pct = format!("{:.1}%", pct(totals.select_time)),
            rollout_pct = format!("{:.1}%", pct(totals.rollout_time)),
            backprop_pct = format!("{:.1}%", pct(totals.backprop_time)),
            avg_rollout_plies = format!("{:.1}", totals.avg_rollout_plies()),
            terminal_hits = totals.terminal_hits,
            max_depth = totals.max_depth,
            "MCTS game stats"
        );
    }
}

/// A finished self-play game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub moves: Vec<(Colour, Action)>,
    pub outcome: Outcome,
    pub final_board: Board,
}

impl GameRecord {
    pub fn plies(&self) -> u32 {
        self.moves.len() as u32
    }
}

pub struct Actor {
    config: Config,
    rules: Rules,
    mcts_config: MctsConfig,
    rng: ChaCha20Rng,
    stats: ActorStats,
}

impl Actor {
    pub fn new(config: Config) -> Result<Self> {
        let rules = config.rules()?;
        let mcts_config = config.mcts_config();
        let stats = ActorStats::new(&config.data_dir, rules.board_size(), rules.win_length());

        info!(
            board_size = rules.board_size(),
            win_length = rules.win_length(),
            simulations = mcts_config.num_simulations,
            exploration = mcts_config.exploration_constant,
            time_limit = ?mcts_config.time_limit,
            seed = config.seed,
            "Actor initialized"
        );

        Ok(Self {
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            config,
            rules,
            mcts_config,
            stats,
        })
    }

    /// Play the configured number of games, then write the final stats.
    pub fn run(&mut self) -> Result<Vec<GameRecord>> {
        let total = self.config.games;
        info!(games = total, "Actor starting self-play");

        // Progress bar only when stderr is a TTY
        let progress = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let mut records = Vec::with_capacity(total as usize);
        for game_num in 1..=total {
            let game_start = Instant::now();
            let (record, search_stats) = self.play_game()?;

            self.stats.record_game(record.plies(), record.outcome);
            self.stats.record_searches(
                search_stats.search_count,
                u64::from(search_stats.totals.simulations),
                search_stats.totals.total_time,
            );

            debug!(
                game = game_num,
                plies = record.plies(),
                outcome = ?record.outcome,
                duration = game_start.elapsed().as_secs_f64(),
                "Game completed"
            );

            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            if self.config.log_interval > 0 && game_num % self.config.log_interval == 0 {
                let log = || {
                    let snapshot = self.stats.snapshot();
                    info!(
                        "Completed {} games: Black {} / White {} / Draw {} (last: {} plies, {:.2}s)",
                        snapshot.games_completed,
                        snapshot.black_wins,
                        snapshot.white_wins,
                        snapshot.draws,
                        record.plies(),
                        game_start.elapsed().as_secs_f64()
                    );
                    search_stats.log_summary(game_num);
                };

                // Suspend progress bar while logging to avoid visual glitches
                match progress {
                    Some(ref pb) => pb.suspend(log),
                    None => log(),
                }
                self.stats.write_stats();
            }

            records.push(record);
        }

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        self.stats.write_stats();
        let snapshot = self.stats.snapshot();
        info!(
            games = snapshot.games_completed,
            black_wins = snapshot.black_wins,
            white_wins = snapshot.white_wins,
            draws = snapshot.draws,
            avg_game_length = format!("{:.1}", snapshot.avg_game_length),
            stats_path = %self.stats.stats_path().display(),
            "Self-play finished"
        );

        Ok(records)
    }

    /// Play one game, Black first. Each side searches from its own
    /// perspective: a fresh root for its colour with the move to play.
    fn play_game(&mut self) -> Result<(GameRecord, GameSearchStats)> {
        let mut board = Board::new(self.rules.board_size());
        let mut colour = Colour::Black;
        let mut moves = Vec::new();
        let mut search_stats = GameSearchStats::default();

        loop {
            let root = GameState::from_board(board, self.rules, colour, true)?;
            let result = run_mcts(root, self.mcts_config.clone(), &mut self.rng)?;
            search_stats.add(&result.stats);

            debug!(
                ply = moves.len() + 1,
                %colour,
                action = %result.action,
                visits = result.visits,
                score = result.score,
                "Move chosen"
            );
            moves.push((colour, result.action));

            if let Some(outcome) = result.winner {
                let record = GameRecord {
                    moves,
                    outcome,
                    final_board: result.state.board().clone(),
                };
                return Ok((record, search_stats));
            }

            board = result.state.board().clone();
            colour = colour.opponent();
        }
    }

    pub fn stats(&self) -> &ActorStats {
        &self.stats
    }
}
