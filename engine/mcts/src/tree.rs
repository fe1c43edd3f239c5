//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices; parents are back-references
//! into the same arena.

use games_gomoku::{Action, GameResult, GameState};

use crate::heuristic::heuristic_score;
use crate::node::{MctsNode, NodeId};
use crate::search::SearchError;

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl MctsTree {
    /// Create a new tree with the given root state.
    pub fn new(root_state: GameState) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_state)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        debug_assert!(id.is_some(), "NodeId::NONE does not refer to a node");
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        debug_assert!(id.is_some(), "NodeId::NONE does not refer to a node");
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        action: Action,
        state: GameState,
        heuristic: f64,
    ) -> NodeId {
        let child = MctsNode::new_child(parent_id, action, state, heuristic);
        let child_id = self.allocate(child);

        self.get_mut(parent_id).children.push(child_id);

        child_id
    }

    /// Materialize the next untried action of `node_id` as a new child.
    ///
    /// Actions are taken from the back of the untried list, so children
    /// appear in reverse row-major order. The child's heuristic is scored
    /// on the parent board before the move is applied.
    pub fn expand(&mut self, node_id: NodeId) -> Result<NodeId, SearchError> {
        let node = self.get_mut(node_id);
        let action = node
            .untried_actions
            .pop()
            .ok_or(SearchError::EmptyLegalMoves)?;

        let state = &node.state;
        let heuristic = heuristic_score(
            state.board(),
            action,
            state.next_mark(),
            state.rules().win_length(),
        );
        let child_state = state.apply(action)?;

        Ok(self.add_child(node_id, action, child_state, heuristic))
    }

    /// Select the best child of a node using UCT plus the positional heuristic.
    ///
    /// Ties keep the earliest child in expansion order. Every child must have
    /// been visited at least once.
    pub fn select_child(&self, node_id: NodeId, c: f64) -> Result<NodeId, SearchError> {
        let node = self.get(node_id);
        // Pre-compute ln once instead of per-child
        let parent_visits_ln = (node.visit_count as f64).ln();

        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &node.children {
            let score = self
                .get(child_id)
                .uct_score(parent_visits_ln, c)
                .ok_or(SearchError::UnvisitedChild(child_id))?;

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }

        best.map(|(id, _)| id)
            .ok_or(SearchError::NoChildren(node_id))
    }

    /// Backpropagate a rollout result from a leaf to the root.
    /// The result is counted from the same perspective at every level.
    pub fn backpropagate(&mut self, leaf_id: NodeId, result: GameResult) {
        let mut current_id = leaf_id;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.record(result);
            current_id = node.parent;
        }
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_score: root.mean_score(),
            max_depth: self.compute_max_depth(),
        }
    }

    fn compute_max_depth(&self) -> u32 {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0u32)];

        while let Some((node_id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.get(node_id).children.iter().map(|&id| (id, depth + 1)));
        }

        max_depth
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_score: f64,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_gomoku::{Board, Colour, Rules};

    fn empty_tree() -> MctsTree {
        MctsTree::new(GameState::new(Rules::default(), Colour::Black))
    }

    fn tree_from(rows: &[&str]) -> MctsTree {
        let board = Board::parse(rows).unwrap();
        let state = GameState::from_board(board, Rules::default(), Colour::Black, true).unwrap();
        MctsTree::new(state)
    }

    #[test]
    fn test_new_tree() {
        let tree = empty_tree();

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.untried_actions.len(), 81);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "NodeId::NONE does not refer to a node")]
    fn test_get_none_panics() {
        let tree = empty_tree();
        let root = tree.get(tree.root());
        tree.get(root.parent);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "NodeId::NONE does not refer to a node")]
    fn test_get_mut_none_panics() {
        let mut tree = empty_tree();
        tree.get_mut(NodeId::NONE);
    }

    #[test]
    fn test_add_child() {
        let mut tree = empty_tree();
        let state = tree.get(tree.root()).state.apply(Action::new(3, 3)).unwrap();

        let child_id = tree.add_child(tree.root(), Action::new(3, 3), state, 0.5);

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));
        assert_eq!(tree.get(tree.root()).children, vec![NodeId(1)]);

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.action, Some(Action::new(3, 3)));
        assert!((child.heuristic - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_expand_takes_actions_in_reverse_order() {
        let mut tree = empty_tree();
        let root = tree.root();

        let first = tree.expand(root).unwrap();
        let second = tree.expand(root).unwrap();

        assert_eq!(tree.get(first).action, Some(Action::new(8, 8)));
        assert_eq!(tree.get(second).action, Some(Action::new(8, 7)));
        assert_eq!(tree.get(root).untried_actions.len(), 79);
        assert_eq!(tree.get(root).children, vec![first, second]);

        // Child state carries Black's stone and hands the move to White
        let child = &tree.get(first).state;
        assert_eq!(child.board().get(8, 8), Some(1));
        assert!(!child.turn());
        assert_eq!(child.colour(), Colour::Black);
    }

    #[test]
    fn test_expand_scores_fourth_stone_with_open_end() {
        let mut tree = tree_from(&[
            ".........",
            ".........",
            "......O..",
            ".........",
            ".XXX.....",
            ".........",
            "......O..",
            "....O....",
            ".........",
        ]);
        let root = tree.root();
        let target = Action::new(4, 4);

        // Move the target to the back so it is expanded next
        let untried = &mut tree.get_mut(root).untried_actions;
        untried.retain(|&a| a != target);
        untried.push(target);

        let child = tree.expand(root).unwrap();
        assert_eq!(tree.get(child).action, Some(target));
        assert_eq!(tree.get(child).heuristic, 100.0);
    }

    #[test]
    fn test_expand_exhausted_node() {
        let mut tree = empty_tree();
        let root = tree.root();
        tree.get_mut(root).untried_actions.clear();

        assert!(matches!(
            tree.expand(root),
            Err(SearchError::EmptyLegalMoves)
        ));
    }

    #[test]
    fn test_backpropagate_does_not_flip() {
        let mut tree = empty_tree();

        // Create a chain: root -> child -> grandchild
        let child_id = tree.expand(tree.root()).unwrap();
        let grandchild_id = tree.expand(child_id).unwrap();

        tree.backpropagate(grandchild_id, GameResult::Win);
        tree.backpropagate(child_id, GameResult::Loss);

        assert_eq!(tree.get(grandchild_id).visit_count, 1);
        assert_eq!(tree.get(child_id).visit_count, 2);
        assert_eq!(tree.get(tree.root()).visit_count, 2);

        assert_eq!(tree.get(grandchild_id).wins, 1);
        assert_eq!(tree.get(child_id).wins, 1);
        assert_eq!(tree.get(child_id).losses, 1);
        assert_eq!(tree.get(tree.root()).wins, 1);
        assert_eq!(tree.get(tree.root()).losses, 1);
    }

    #[test]
    fn test_select_child_prefers_higher_mean() {
        let mut tree = empty_tree();
        let root = tree.root();
        let a = tree.expand(root).unwrap();
        let b = tree.expand(root).unwrap();

        tree.backpropagate(a, GameResult::Loss);
        tree.backpropagate(b, GameResult::Win);

        assert_eq!(tree.select_child(root, 0.0).unwrap(), b);
        assert_eq!(tree.select_child(root, 1.0).unwrap(), b);
    }

    #[test]
    fn test_select_child_ties_keep_first() {
        let mut tree = empty_tree();
        let root = tree.root();
        let children: Vec<_> = (0..3).map(|_| tree.expand(root).unwrap()).collect();

        for &child in &children {
            tree.backpropagate(child, GameResult::Draw);
        }

        assert_eq!(tree.select_child(root, 0.0).unwrap(), children[0]);
        assert_eq!(tree.select_child(root, 2f64.sqrt()).unwrap(), children[0]);
        // Stable on an unchanged tree
        assert_eq!(tree.select_child(root, 0.0).unwrap(), children[0]);
    }

    #[test]
    fn test_select_child_heuristic_breaks_even_scores() {
        let mut tree = empty_tree();
        let root = tree.root();
        let a = tree.expand(root).unwrap();
        let b = tree.expand(root).unwrap();
        tree.get_mut(b).heuristic = 2.0;

        tree.backpropagate(a, GameResult::Win);
        tree.backpropagate(b, GameResult::Draw);

        // a: 1.0 + 0, b: 0.0 + 2.0
        assert_eq!(tree.select_child(root, 0.0).unwrap(), b);
    }

    #[test]
    fn test_select_child_errors() {
        let mut tree = empty_tree();
        let root = tree.root();

        assert!(matches!(
            tree.select_child(root, 1.0),
            Err(SearchError::NoChildren(id)) if id == root
        ));

        let child = tree.expand(root).unwrap();
        tree.get_mut(root).visit_count = 1;
        assert!(matches!(
            tree.select_child(root, 1.0),
            Err(SearchError::UnvisitedChild(id)) if id == child
        ));
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = empty_tree();
        let child = tree.expand(tree.root()).unwrap();
        tree.expand(tree.root()).unwrap();
        let grandchild = tree.expand(child).unwrap();
        tree.backpropagate(grandchild, GameResult::Win);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.root_visits, 1);
        assert!((stats.root_score - 1.0).abs() < 1e-12);
        assert_eq!(stats.max_depth, 2);
    }
}
