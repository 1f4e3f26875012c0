//! Explicit game tree for the iterative minimax
//!
//! Nodes live in an arena and refer to each other by index, so the tree
//! carries no back-pointers and is dropped in one piece when the search
//! returns.
//!
//! Each node moves through three stages:
//! `Unexpanded` (holds its state) -> `Expanded` (children pushed, state
//! released) -> `Scored`. Terminal nodes go straight from `Unexpanded` to
//! `Scored`.

use crate::game::{GameState, Move};

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Where a node is in the search
#[derive(Clone, Debug)]
pub enum NodeStatus {
    Unexpanded(GameState),
    Expanded,
    Scored(i32),
}

/// A node in the search tree
#[derive(Clone, Debug)]
pub struct SearchNode {
    pub status: NodeStatus,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Move that led to this node (None for root)
    pub incoming_move: Option<Move>,
    /// Children in move-generation order
    pub children: Vec<NodeId>,
}

impl SearchNode {
    fn new(state: GameState, parent: Option<NodeId>, incoming_move: Option<Move>) -> Self {
        Self {
            status: NodeStatus::Unexpanded(state),
            parent,
            incoming_move,
            children: Vec::new(),
        }
    }

    pub fn score(&self) -> Option<i32> {
        match self.status {
            NodeStatus::Scored(score) => Some(score),
            _ => None,
        }
    }

    /// State of a node that has not been expanded yet
    pub fn state(&self) -> Option<&GameState> {
        match &self.status {
            NodeStatus::Unexpanded(state) => Some(state),
            _ => None,
        }
    }
}

// ============================================================================
// SEARCH TREE
// ============================================================================

/// Minimax search tree with arena allocation
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    pub fn new(root_state: GameState) -> Self {
        Self {
            nodes: vec![SearchNode::new(root_state, None, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add one child per successor, in the order given, and release the
    /// node's own state. Returns the new children.
    ///
    /// Does nothing for a node that is already expanded or scored.
    pub fn expand(
        &mut self,
        id: NodeId,
        successors: impl IntoIterator<Item = (Move, GameState)>,
    ) -> Vec<NodeId> {
        if !matches!(self.nodes[id.0].status, NodeStatus::Unexpanded(_)) {
            return Vec::new();
        }

        let mut children = Vec::new();
        for (mv, state) in successors {
            let child = NodeId(self.nodes.len());
            self.nodes.push(SearchNode::new(state, Some(id), Some(mv)));
            children.push(child);
        }

        let node = &mut self.nodes[id.0];
        node.status = NodeStatus::Expanded;
        node.children = children.clone();
        children
    }

    pub fn set_score(&mut self, id: NodeId, score: i32) {
        self.nodes[id.0].status = NodeStatus::Scored(score);
    }

    /// Negamax score of an expanded node from its scored children.
    ///
    /// `None` if any child is still unscored.
    pub fn score_from_children(&self, id: NodeId) -> Option<i32> {
        let mut best: Option<i32> = None;
        for &child in &self.get(id).children {
            let score = -self.get(child).score()?;
            best = Some(best.map_or(score, |b| b.max(score)));
        }
        best
    }

    /// First root move whose child's negated score equals the root score
    pub fn best_move(&self) -> Option<Move> {
        let root = self.get(self.root());
        let target = root.score()?;
        root.children
            .iter()
            .map(|&child| self.get(child))
            .find(|child| child.score().map(|s| -s) == Some(target))
            .and_then(|child| child.incoming_move)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;

    fn root_state() -> GameState {
        GameState::new(1, Player::P1).unwrap()
    }

    fn expand_root(tree: &mut SearchTree) -> Vec<NodeId> {
        let state = tree.get(NodeId::ROOT).state().unwrap().clone();
        let successors: Vec<_> = state
            .possible_moves()
            .iter()
            .map(|&mv| (mv, state.apply_move(mv).unwrap()))
            .collect();
        tree.expand(NodeId::ROOT, successors)
    }

    #[test]
    fn test_tree_creation() {
        let tree = SearchTree::new(root_state());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);
        assert!(tree.get(NodeId::ROOT).state().is_some());
        assert_eq!(tree.get(NodeId::ROOT).score(), None);
    }

    #[test]
    fn test_expansion_releases_state() {
        let mut tree = SearchTree::new(root_state());
        let children = expand_root(&mut tree);

        assert_eq!(children.len(), 3);
        assert_eq!(tree.len(), 4);
        assert!(tree.get(NodeId::ROOT).state().is_none());
        for (child, label) in children.iter().zip(['A', 'B', 'C']) {
            let node = tree.get(*child);
            assert_eq!(node.parent, Some(NodeId::ROOT));
            assert_eq!(node.incoming_move, Some(Move::new(label)));
        }

        // Expanding twice is a no-op
        assert!(tree.expand(NodeId::ROOT, Vec::new()).is_empty());
        assert_eq!(tree.get(NodeId::ROOT).children.len(), 3);
    }

    #[test]
    fn test_scoring_and_best_move() {
        let mut tree = SearchTree::new(root_state());
        let children = expand_root(&mut tree);

        assert_eq!(tree.score_from_children(NodeId::ROOT), None);

        tree.set_score(children[0], 1);
        tree.set_score(children[1], -1);
        tree.set_score(children[2], -1);

        let score = tree.score_from_children(NodeId::ROOT).unwrap();
        assert_eq!(score, 1);
        tree.set_score(NodeId::ROOT, score);

        // First child matching the root score wins the tie
        assert_eq!(tree.best_move(), Some(Move::new('B')));
    }
}
