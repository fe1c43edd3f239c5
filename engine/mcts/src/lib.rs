//! Monte Carlo Tree Search (MCTS) with random rollouts for Gomoku.
//!
//! This crate searches [`games_gomoku::GameState`] positions and returns the
//! move with the best aggregated rollout score.
//!
//! # Overview
//!
//! MCTS is a search algorithm that builds a search tree by running simulations.
//! Each simulation consists of four phases:
//!
//! 1. **Selection**: Descend the tree with UCT (Upper Confidence bounds applied
//!    to Trees) plus a positional heuristic
//! 2. **Expansion**: When a node still has untried actions, materialize one of
//!    them as a new child
//! 3. **Rollout**: Play uniformly random moves from the new node until the
//!    game ends
//! 4. **Backpropagation**: Count the rollout result on every node from the
//!    leaf back to the root
//!
//! All statistics are kept from the perspective of the colour the search was
//! started for; results are not flipped between plies.
//!
//! # Usage
//!
//! ```rust
//! use games_gomoku::{Colour, GameState, Rules};
//! use mcts::{run_mcts, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let state = GameState::new(Rules::default(), Colour::Black);
//! let config = MctsConfig::for_testing();
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = run_mcts(state, config, &mut rng).unwrap();
//!
//! assert_eq!(result.simulations, 50);
//! println!("Best action: {}", result.action);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_simulations`: Number of simulations per search (default: 100)
//! - `exploration_constant`: UCT exploration constant (default: √2)
//! - `time_limit`: Optional wall-clock budget (default: none)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   MctsSearch                    │
//! ├─────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐  │
//! │  │  MctsTree   │  │  GameState  │  │  Rng    │  │
//! │  │  (arena)    │  │ (game sim)  │  │(rollout)│  │
//! │  └──────┬──────┘  └──────┬──────┘  └────┬────┘  │
//! │         ▼                ▼              ▼       │
//! │  ┌───────────────────────────────────────────┐  │
//! │  │  select → expand → rollout → backpropagate│  │
//! │  └───────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod heuristic;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use heuristic::heuristic_score;
pub use node::{MctsNode, NodeId};
pub use search::{rollout, run_mcts, MctsSearch, SearchError, SearchResult, SearchStats};
pub use tree::{MctsTree, TreeStats};
