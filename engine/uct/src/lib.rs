//! Monte-Carlo tree search with UCB1 action selection (UCT) for finite MDPs.
//!
//! This crate provides an environment-agnostic UCT planner that works with
//! any environment implementing the `mdp-core` [`Mdp`](mdp_core::Mdp) trait.
//!
//! # Overview
//!
//! UCT builds its search tree incrementally. Each simulation:
//!
//! 1. **Selects** actions down the tree with UCB1, balancing the observed
//!    mean return against a confidence bonus
//! 2. **Expands** nodes lazily, materializing one successor per stochastic
//!    outcome the first time a simulation passes through
//! 3. **Rolls out** a fast random policy once the branch leaves the tree,
//!    instead of expanding the whole state space
//! 4. **Records** discounted returns back up the path as the recursion
//!    unwinds
//!
//! Recursion depth is bounded by the discount-derived horizon in
//! [`UctConfig::search_depth`], so stack usage is bounded by construction.
//!
//! # Usage
//!
//! ```rust,ignore
//! use uct::{UctConfig, UctSearch};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let mut search = UctSearch::new(&env, UctConfig::default(), start)?;
//! let action = search.search(search.root(), 1024, &mut rng)?;
//! ```
//!
//! The tree is owned by the [`UctSearch`] session and dropped in bulk with
//! it; nothing is shared across sessions or across threads.

pub mod config;
pub mod node;
pub mod search;
pub mod select;
pub mod tree;

// Re-export main types
pub use config::UctConfig;
pub use node::{NodeId, SearchNode};
pub use search::{SearchError, UctSearch};
pub use select::select_action;
pub use tree::{SearchTree, TreeStats};
