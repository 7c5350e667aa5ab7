//! UCT search implementation.
//!
//! Implements the core algorithm over any [`Mdp`] environment:
//! 1. Selection: descend the tree one step at a time using UCB1
//! 2. Expansion: materialize every successor of a node on first pass
//! 3. Rollout: estimate unexplored territory with a random policy
//! 4. Backpropagation: record discounted returns on the recursion unwind
//!
//! Each simulation adds exactly one node to the visited frontier, so tree
//! growth is bounded by the simulation budget while deeper states are
//! approximated by the cheap rollout estimator.

use mdp_core::Mdp;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::trace;

use crate::config::UctConfig;
use crate::node::{NodeId, SearchNode};
use crate::select::select_action;
use crate::tree::SearchTree;

/// Errors that can occur during UCT search.
///
/// All of these are contract violations rather than recoverable runtime
/// conditions; no operation retries.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },

    #[error("state has no legal actions")]
    NoActions,

    #[error("action is not available at this node")]
    UnknownAction,

    #[error("no successor matches the observed state")]
    SuccessorNotFound,
}

/// One UCT planning session: the tree, the environment it samples and the
/// search parameters.
///
/// The tree lives exactly as long as the session; dropping the session
/// drops the whole arena in one deallocation.
#[derive(Debug)]
pub struct UctSearch<'a, M: Mdp> {
    mdp: &'a M,
    config: UctConfig,
    /// Discount-derived recursion bound, cached at construction.
    depth: u32,
    tree: SearchTree<M::State, M::Action>,
}

impl<'a, M: Mdp> UctSearch<'a, M> {
    /// Create a session rooted at `root_state` and expand the root.
    pub fn new(mdp: &'a M, config: UctConfig, root_state: M::State) -> Result<Self, SearchError> {
        if !(config.discount.is_finite() && config.discount > 0.0 && config.discount < 1.0) {
            return Err(SearchError::InvalidConfig {
                msg: "discount must lie in (0, 1)",
            });
        }
        if !(config.exploration.is_finite() && config.exploration >= 0.0) {
            return Err(SearchError::InvalidConfig {
                msg: "exploration must be finite and >= 0",
            });
        }

        let actions = mdp.actions(&root_state);
        if actions.is_empty() {
            return Err(SearchError::NoActions);
        }

        let depth = config.search_depth();
        let tree = SearchTree::new(SearchNode::new(root_state, actions));
        let mut search = Self {
            mdp,
            config,
            depth,
            tree,
        };
        let root = search.tree.root();
        search.expand_node(root);
        Ok(search)
    }

    /// The search tree (for inspection and tests).
    pub fn tree(&self) -> &SearchTree<M::State, M::Action> {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Plan from `node`: run `simulations` independent simulations, each
    /// starting from a fresh copy of the node's state, then return the
    /// greedy action.
    pub fn search(
        &mut self,
        node: NodeId,
        simulations: u32,
        rng: &mut ChaCha20Rng,
    ) -> Result<M::Action, SearchError> {
        for _ in 0..simulations {
            let state = self.tree.get(node).state().clone();
            self.simulate(state, node, self.depth, rng)?;
        }

        trace!(
            node = node.0,
            simulations,
            nodes = self.tree.len(),
            "search complete"
        );

        let best = select_action(&self.tree, node, self.config.exploration, true, rng)?;
        Ok(self.tree.get(node).actions()[best])
    }

    /// One recursive simulation pass.
    ///
    /// Takes the working state by value: every recursion level owns its own
    /// copy of the trajectory state, so no aliasing can occur between the
    /// tree and the trajectory.
    fn simulate(
        &mut self,
        mut state: M::State,
        node: NodeId,
        depth: u32,
        rng: &mut ChaCha20Rng,
    ) -> Result<f64, SearchError> {
        if depth == 0 {
            return Ok(0.0);
        }

        let action_index =
            select_action(&self.tree, node, self.config.exploration, false, rng)?;
        let action = self.tree.get(node).actions()[action_index];
        let (reward, terminal) = self.mdp.step(&mut state, action, rng);

        if !self.tree.get(node).is_expanded() {
            self.expand_node(node);
        }

        let delayed = if terminal {
            0.0
        } else {
            let successor = self
                .tree
                .successor_matching(node, action_index, &state)
                .ok_or(SearchError::SuccessorNotFound)?;

            if self.tree.get(successor).visits() == 0 {
                // First entry into this branch: stop descending, estimate
                // the remainder with a rollout and mark the node entered.
                let value = self.rollout(state, depth - 1, rng)?;
                self.tree.get_mut(successor).mark_visited();
                value
            } else {
                self.simulate(state, successor, depth - 1, rng)?
            }
        };

        let total = reward + self.config.discount * delayed;
        self.tree.get_mut(node).record_outcome(action_index, total);
        Ok(total)
    }

    /// Tree-free random-policy evaluation of `state` for up to `depth`
    /// steps. Returns the discounted sum of sampled rewards; exactly zero
    /// when the budget is already exhausted.
    pub fn rollout(
        &self,
        mut state: M::State,
        depth: u32,
        rng: &mut ChaCha20Rng,
    ) -> Result<f64, SearchError> {
        let mut total = 0.0;
        let mut discount = 1.0;

        for _ in 0..depth {
            let actions = self.mdp.actions(&state);
            if actions.is_empty() {
                return Err(SearchError::NoActions);
            }
            let action = actions[rng.gen_range(0..actions.len())];
            let (reward, terminal) = self.mdp.step(&mut state, action, rng);

            total += reward * discount;
            discount *= self.config.discount;
            if terminal {
                break;
            }
        }

        Ok(total)
    }

    /// Materialize every successor of `node`: one full-width environment
    /// query per action, one fresh node per outcome, each with its own
    /// freshly-queried action set. Expansion cost is paid once per node and
    /// a second call is a no-op.
    pub fn expand_node(&mut self, node: NodeId) {
        if self.tree.get(node).is_expanded() {
            return;
        }

        let state = self.tree.get(node).state().clone();
        let actions: Vec<M::Action> = self.tree.get(node).actions().to_vec();

        let mut successors = Vec::with_capacity(actions.len());
        for action in actions {
            let outcomes = self.mdp.expand(&state, action);
            let mut ids = Vec::with_capacity(outcomes.len());
            for outcome in outcomes {
                let child_actions = self.mdp.actions(&outcome.state);
                ids.push(
                    self.tree
                        .allocate(SearchNode::new(outcome.state, child_actions)),
                );
            }
            successors.push(ids);
        }
        self.tree.get_mut(node).set_successors(successors);
    }

    /// Advance to the successor of `node` matching the real outcome of
    /// executing `action` against the environment.
    ///
    /// A missing match means the caller handed in a state the expansion
    /// step never produced — a broken environment contract.
    pub fn advance(
        &mut self,
        node: NodeId,
        action: M::Action,
        observed: &M::State,
    ) -> Result<NodeId, SearchError> {
        let action_index = self
            .tree
            .get(node)
            .action_index(action)
            .ok_or(SearchError::UnknownAction)?;
        if !self.tree.get(node).is_expanded() {
            self.expand_node(node);
        }
        self.tree
            .successor_matching(node, action_index, observed)
            .ok_or(SearchError::SuccessorNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envs_gridmaze::{GridPos, Maze, MazeAction, MazeConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn open_maze(rows: usize, cols: usize) -> Maze {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        Maze::new(MazeConfig::new(rows, cols), &mut rng)
    }

    fn visited_nodes(search: &UctSearch<'_, Maze>) -> usize {
        let tree = search.tree();
        (0..tree.len())
            .filter(|&i| tree.get(NodeId(i as u32)).visits() > 0)
            .count()
    }

    #[test]
    fn new_session_expands_the_root() {
        let maze = open_maze(3, 3);
        let search = UctSearch::new(&maze, UctConfig::default(), maze.start()).unwrap();

        let root = search.tree().get(search.root());
        assert!(root.is_expanded());
        assert_eq!(root.visits(), 0);
        // Four actions, one deterministic outcome each.
        assert_eq!(search.tree().len(), 5);
    }

    #[test]
    fn invalid_discount_is_rejected() {
        let maze = open_maze(3, 3);
        for discount in [0.0, 1.0, 1.5, f64::NAN] {
            let config = UctConfig::default().with_discount(discount);
            let err = UctSearch::new(&maze, config, maze.start()).unwrap_err();
            assert!(matches!(err, SearchError::InvalidConfig { .. }));
        }
    }

    #[test]
    fn rollout_with_zero_depth_returns_zero() {
        let maze = open_maze(3, 3);
        let search = UctSearch::new(&maze, UctConfig::default(), maze.start()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        for state in maze.list_states() {
            let value = search.rollout(state, 0, &mut rng).unwrap();
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn each_simulation_adds_at_most_one_frontier_node() {
        let maze = open_maze(4, 4);
        let mut search = UctSearch::new(&maze, UctConfig::default(), maze.start()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(2);

        let root = search.root();
        search.search(root, 1, &mut rng).unwrap();
        // The root plus exactly one newly-entered frontier node.
        assert_eq!(visited_nodes(&search), 2);

        search.search(root, 9, &mut rng).unwrap();
        assert!(visited_nodes(&search) <= 11);
    }

    #[test]
    fn expansion_is_idempotent() {
        let maze = open_maze(3, 3);
        let mut search = UctSearch::new(&maze, UctConfig::default(), maze.start()).unwrap();

        let before = search.tree().len();
        search.expand_node(search.root());
        search.expand_node(search.root());
        assert_eq!(search.tree().len(), before);
    }

    #[test]
    fn tree_depth_never_exceeds_the_horizon() {
        let maze = open_maze(3, 3);
        let config = UctConfig::default().with_discount(0.5);
        assert_eq!(config.search_depth(), 7);

        let mut search = UctSearch::new(&maze, config, maze.start()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let root = search.root();
        search.search(root, 500, &mut rng).unwrap();

        assert!(search.tree().stats().max_depth <= 7);
    }

    #[test]
    fn search_finds_a_shortest_path_action() {
        // 3x3 open grid, start top-left, goal bottom-right: with a healthy
        // budget the greedy root action must move closer to the goal.
        let maze = open_maze(3, 3);
        let config = UctConfig::default();
        let mut search = UctSearch::new(&maze, config, maze.start()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let root = search.root();
        let action = search.search(root, 1024, &mut rng).unwrap();
        assert!(
            action == MazeAction::Down || action == MazeAction::Right,
            "greedy action {action:?} does not approach the goal"
        );

        let mut next = maze.start();
        let before = maze.start().manhattan(&maze.goal());
        maze.step(&mut next, action, &mut rng);
        assert!(next.manhattan(&maze.goal()) < before);
    }

    #[test]
    fn advance_follows_the_real_outcome() {
        let maze = open_maze(3, 3);
        let mut search = UctSearch::new(&maze, UctConfig::default(), maze.start()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(5);

        let root = search.root();
        search.search(root, 64, &mut rng).unwrap();

        let mut state = maze.start();
        maze.step(&mut state, MazeAction::Down, &mut rng);

        let next = search.advance(root, MazeAction::Down, &state).unwrap();
        assert_eq!(*search.tree().get(next).state(), state);
        assert_ne!(next, root);
    }

    #[test]
    fn advance_rejects_foreign_states() {
        let maze = open_maze(3, 3);
        let mut search = UctSearch::new(&maze, UctConfig::default(), maze.start()).unwrap();

        let foreign = GridPos::new(7, 7);
        let err = search
            .advance(search.root(), MazeAction::Down, &foreign)
            .unwrap_err();
        assert!(matches!(err, SearchError::SuccessorNotFound));
    }

    #[test]
    fn session_over_empty_action_space_is_rejected() {
        #[derive(Debug)]
        struct Void;
        impl Mdp for Void {
            type State = u8;
            type Action = u8;
            fn actions(&self, _: &u8) -> Vec<u8> {
                Vec::new()
            }
            fn step(&self, _: &mut u8, _: u8, _: &mut ChaCha20Rng) -> (f64, bool) {
                unreachable!("no actions to step with")
            }
            fn expand(&self, _: &u8, _: u8) -> Vec<mdp_core::Outcome<u8>> {
                Vec::new()
            }
            fn list_states(&self) -> Vec<u8> {
                vec![0]
            }
            fn is_terminal(&self, _: &u8) -> bool {
                false
            }
        }

        let err = UctSearch::new(&Void, UctConfig::default(), 0).unwrap_err();
        assert!(matches!(err, SearchError::NoActions));
    }
}
