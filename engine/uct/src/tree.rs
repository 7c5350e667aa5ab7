//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and reference each other by `NodeId`
//! indices. The arena is owned by the episode that built it and dropped in
//! bulk at episode end, so no recursive destruction is ever needed. The tree
//! is a strict forest: successors are freshly materialized per expansion and
//! never shared, even when two expansions describe equal states.

use crate::node::{NodeId, SearchNode};

/// Arena-backed UCT search tree.
#[derive(Debug)]
pub struct SearchTree<S, A> {
    nodes: Vec<SearchNode<S, A>>,
    root: NodeId,
}

impl<S: Clone + PartialEq, A: Copy + Eq> SearchTree<S, A> {
    /// Create a tree holding only `root`.
    pub fn new(root: SearchNode<S, A>) -> Self {
        Self {
            nodes: vec![root],
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
    pub fn get(&self, id: NodeId) -> &SearchNode<S, A> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<S, A> {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: SearchNode<S, A>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Total number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the successor of `node` under `action` whose state equals
    /// `state` (linear scan of the action's outcome set).
    ///
    /// Returns `None` when no entry matches — on an expanded node that
    /// signals a caller bug, since the expansion step enumerated every state
    /// the environment can produce.
    pub fn successor_matching(
        &self,
        node: NodeId,
        action: usize,
        state: &S,
    ) -> Option<NodeId> {
        self.get(node)
            .successors(action)
            .iter()
            .copied()
            .find(|&id| self.get(id).state() == state)
    }

    /// Tree shape statistics for logging and tests.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits(),
            max_depth: self.max_depth_from(self.root, 0),
        }
    }

    fn max_depth_from(&self, id: NodeId, depth: u32) -> u32 {
        let node = self.get(id);
        let mut max = depth;
        for action in 0..node.actions().len() {
            for &child in node.successors(action) {
                // Unvisited successors were materialized by expansion but
                // never entered; they do not count towards search depth.
                if self.get(child).visits() > 0 {
                    max = max.max(self.max_depth_from(child, depth + 1));
                }
            }
        }
        max
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
}
