//! MCTS tree node representation.
//!
//! Each node represents a game state reached by taking an action from the parent.
//! Nodes store visit and outcome statistics used for UCT selection.

use games_gomoku::{Action, GameResult, GameState};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Action that led to this node from parent (None for root)
    pub action: Option<Action>,

    /// Game state at this node
    pub state: GameState,

    /// Child node indices, in expansion order
    pub children: Vec<NodeId>,

    /// Number of times this node has been visited
    pub visit_count: u32,

    /// Rollouts through this node won by the perspective colour
    pub wins: u32,

    /// Rollouts through this node lost by the perspective colour
    pub losses: u32,

    /// Rollouts through this node that ended in a draw
    pub draws: u32,

    /// Legal actions not yet materialized as children.
    /// Popped from the back, so the last legal action is tried first.
    pub untried_actions: Vec<Action>,

    /// Positional heuristic of `action` on the parent board (0.0 for root)
    pub heuristic: f64,
}

impl MctsNode {
    /// Create a new root node.
    pub fn new_root(state: GameState) -> Self {
        Self::build(NodeId::NONE, None, state, 0.0)
    }

    /// Create a new child node.
    pub fn new_child(parent: NodeId, action: Action, state: GameState, heuristic: f64) -> Self {
        Self::build(parent, Some(action), state, heuristic)
    }

    fn build(parent: NodeId, action: Option<Action>, state: GameState, heuristic: f64) -> Self {
        // Terminal states are never expanded
        let untried_actions = if state.is_terminal() {
            Vec::new()
        } else {
            state.legal_actions()
        };

        Self {
            parent,
            action,
            state,
            children: Vec::new(),
            visit_count: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            untried_actions,
            heuristic,
        }
    }

    /// Net score: wins minus losses.
    #[inline]
    pub fn score(&self) -> f64 {
        self.wins as f64 - self.losses as f64
    }

    /// Average score per visit. Returns 0.0 if never visited.
    #[inline]
    pub fn mean_score(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.score() / self.visit_count as f64
        }
    }

    /// Calculate the selection score of this node as a child.
    ///
    /// `score / N + c * sqrt(2 * ln(N_parent) / N) + heuristic`
    ///
    /// Takes pre-computed `ln(N_parent)` to avoid redundant logs when comparing
    /// multiple children. The exploration term is skipped entirely when `c` is
    /// zero. Returns `None` for an unvisited node.
    #[inline]
    pub fn uct_score(&self, parent_visits_ln: f64, c: f64) -> Option<f64> {
        if self.visit_count == 0 {
            return None;
        }

        let visits = self.visit_count as f64;
        let exploitation = self.score() / visits;
        let exploration = if c == 0.0 {
            0.0
        } else {
            c * (2.0 * parent_visits_ln / visits).sqrt()
        };

        Some(exploitation + exploration + self.heuristic)
    }

    /// Count one rollout result.
    #[inline]
    pub fn record(&mut self, result: GameResult) {
        self.visit_count += 1;
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Draw => self.draws += 1,
        }
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_actions.is_empty()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
