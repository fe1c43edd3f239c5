//! MCTS search implementation.
//!
//! Implements the core MCTS loop:
//! 1. Selection: Descend with UCT plus heuristic until a node is terminal
//!    or still has untried actions
//! 2. Expansion: Materialize one untried action as a new child
//! 3. Rollout: Play uniformly random moves until the game ends
//! 4. Backpropagation: Count the rollout result on every node up to the root

use std::time::{Duration, Instant};

use games_gomoku::{Action, GameError, GameResult, GameState, Outcome};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::node::NodeId;
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("No legal moves available in a non-terminal position")]
    EmptyLegalMoves,

    #[error("Child {0:?} has no visits and cannot be scored")]
    UnvisitedChild(NodeId),

    #[error("Node {0:?} has no children to select from")]
    NoChildren(NodeId),

    #[error("Cannot search a position that is already decided")]
    TerminalPosition,
}

/// Counters and timings collected over one search.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Simulations actually run (may be below the budget under a time limit)
    pub simulations: u32,

    /// Wall time for the whole search
    pub total_time: Duration,

    /// Time spent in selection and expansion
    pub select_time: Duration,

    /// Time spent in random playouts
    pub rollout_time: Duration,

    /// Time spent updating statistics
    pub backprop_time: Duration,

    /// Random moves played across all rollouts
    pub rollout_plies: u64,

    /// Simulations whose selected leaf was already terminal
    pub terminal_hits: u32,

    /// Nodes in the tree when the search finished
    pub tree_nodes: usize,

    /// Deepest node below the root
    pub max_depth: u32,
}

impl SearchStats {
    /// Mean rollout length, 0.0 before any simulation.
    pub fn avg_rollout_plies(&self) -> f64 {
        if self.simulations == 0 {
            0.0
        } else {
            self.rollout_plies as f64 / self.simulations as f64
        }
    }
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best action to take
    pub action: Action,

    /// Position after playing `action`
    pub state: GameState,

    /// Whether `state` ends the game
    pub is_terminal: bool,

    /// Verdict of `state`, if the game is over
    pub winner: Option<Outcome>,

    /// Visits of the root (equals simulations run)
    pub simulations: u32,

    /// Visits of the chosen child
    pub visits: u32,

    /// Net score (wins minus losses) of the chosen child
    pub score: f64,

    pub stats: SearchStats,
}

/// MCTS search state.
pub struct MctsSearch {
    tree: MctsTree,
    config: MctsConfig,
    stats: SearchStats,
}

impl MctsSearch {
    /// Create a new MCTS search from the given game state.
    pub fn new(state: GameState, config: MctsConfig) -> Result<Self, SearchError> {
        if state.is_terminal() {
            return Err(SearchError::TerminalPosition);
        }

        Ok(Self {
            tree: MctsTree::new(state),
            config,
            stats: SearchStats::default(),
        })
    }

    /// Run the search for the configured number of simulations and return
    /// the root child with the best score under a zero exploration constant.
    ///
    /// When a time limit is set it is checked before every simulation but the
    /// first, so at least one simulation always runs.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<SearchResult, SearchError> {
        let start = Instant::now();

        for i in 0..self.config.num_simulations {
            if i > 0 {
                if let Some(limit) = self.config.time_limit {
                    if start.elapsed() >= limit {
                        debug!(completed = i, ?limit, "MCTS time limit reached");
                        break;
                    }
                }
            }
            self.simulate(rng)?;
        }

        let tree_stats = self.tree.stats();
        self.stats.total_time = start.elapsed();
        self.stats.tree_nodes = tree_stats.total_nodes;
        self.stats.max_depth = tree_stats.max_depth;

        let root_id = self.tree.root();
        let best_id = self.tree.select_child(root_id, 0.0)?;
        let best = self.tree.get(best_id);
        let action = best.action.ok_or(SearchError::NoChildren(root_id))?;

        debug!(
            %action,
            simulations = self.stats.simulations,
            visits = best.visit_count,
            score = best.score(),
            heuristic = best.heuristic,
            nodes = self.stats.tree_nodes,
            max_depth = self.stats.max_depth,
            avg_rollout_plies = format!("{:.1}", self.stats.avg_rollout_plies()),
            elapsed_ms = self.stats.total_time.as_millis() as u64,
            "MCTS search complete"
        );

        Ok(SearchResult {
            action,
            state: best.state.clone(),
            is_terminal: best.is_terminal(),
            winner: best.state.winner(),
            simulations: tree_stats.root_visits,
            visits: best.visit_count,
            score: best.score(),
            stats: self.stats.clone(),
        })
    }

    /// Run a single simulation (select/expand -> rollout -> backpropagate).
    fn simulate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SearchError> {
        let t0 = Instant::now();
        let leaf_id = self.tree_policy()?;
        let t1 = Instant::now();

        let leaf = self.tree.get(leaf_id);
        if leaf.is_terminal() {
            self.stats.terminal_hits += 1;
        }
        let (result, plies) = rollout(&leaf.state, rng)?;
        let t2 = Instant::now();

        self.tree.backpropagate(leaf_id, result);
        let t3 = Instant::now();

        self.stats.simulations += 1;
        self.stats.rollout_plies += u64::from(plies);
        self.stats.select_time += t1 - t0;
        self.stats.rollout_time += t2 - t1;
        self.stats.backprop_time += t3 - t2;

        trace!(
            leaf = leaf_id.0,
            plies,
            result = ?result,
            "MCTS simulation complete"
        );

        Ok(())
    }

    /// Walk from the root to the node this simulation will roll out from.
    fn tree_policy(&mut self) -> Result<NodeId, SearchError> {
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);

            if node.is_terminal() {
                return Ok(current);
            }

            if !node.is_fully_expanded() {
                return self.tree.expand(current);
            }

            current = self
                .tree
                .select_child(current, self.config.exploration_constant)?;
        }
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }
}

/// Play uniformly random legal moves from `state` until the game ends.
///
/// Returns the outcome for the colour `state` is searched for, together
/// with the number of moves played.
pub fn rollout<R: Rng + ?Sized>(
    state: &GameState,
    rng: &mut R,
) -> Result<(GameResult, u32), SearchError> {
    let perspective = state.colour();
    let mut current = state.clone();
    let mut plies = 0;

    loop {
        if let Some(result) = current.outcome_for(perspective) {
            return Ok((result, plies));
        }

        let legal = current.legal_actions();
        if legal.is_empty() {
            return Err(SearchError::EmptyLegalMoves);
        }

        let action = legal[rng.gen_range(0..legal.len())];
        current = current.apply(action)?;
        plies += 1;
    }
}

/// Convenience function to run a single MCTS search.
pub fn run_mcts<R: Rng + ?Sized>(
    state: GameState,
    config: MctsConfig,
    rng: &mut R,
) -> Result<SearchResult, SearchError> {
    let mut search = MctsSearch::new(state, config)?;
    search.run(rng)
}
