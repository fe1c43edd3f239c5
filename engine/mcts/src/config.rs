//! MCTS configuration parameters.

use std::time::Duration;

/// Default number of simulations per search.
pub const DEFAULT_SIMULATIONS: u32 = 100;

/// Default UCT exploration constant.
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of simulations (tree policy, rollout, backpropagation) per search.
    pub num_simulations: u32,

    /// Exploration constant scaling the UCT bonus
    /// `sqrt(2 * ln(N_parent) / N_child)`.
    /// Only used while searching; the final move is chosen with 0.0.
    pub exploration_constant: f64,

    /// Optional wall-clock budget, checked between simulations.
    /// At least one simulation always runs.
    pub time_limit: Option<Duration>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_SIMULATIONS,
            exploration_constant: DEFAULT_EXPLORATION,
            time_limit: None,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 50,
            ..Self::default()
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: stop searching once `limit` has elapsed.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}
