//! Core abstractions for finite Markov Decision Processes.
//!
//! This crate defines the environment contract consumed by the planners:
//! - [`Mdp`]: typed trait describing a finite MDP with a generative step
//!   function and a full-width expansion function
//! - [`Outcome`]: one entry of a transition distribution
//!
//! The generative interface (`step`) is what sampling-based planners such as
//! UCT consume; the full-width interface (`expand`, `list_states`) serves
//! tree expansion and exhaustive planners such as value iteration.

use rand_chacha::ChaCha20Rng;

/// One possible result of taking an action in a state.
///
/// Produced by [`Mdp::expand`]. For a given `(state, action)` pair the
/// probabilities of all returned outcomes sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<S> {
    /// Resulting state.
    pub state: S,
    /// Immediate reward for this transition.
    pub reward: f64,
    /// Probability of this transition occurring.
    pub probability: f64,
}

/// Main trait for MDP environment implementations.
///
/// Environments implement this trait with their specific state and action
/// types. States are opaque value types: compared structurally, never by
/// identity, and immutable once constructed (the step function replaces the
/// state in place rather than mutating its interior).
///
/// # Type Parameters
///
/// * `State` - environment configuration descriptor, cheap to clone
/// * `Action` - small `Copy` type, typically an enum
pub trait Mdp {
    /// State type - value-comparable descriptor of the configuration.
    type State: Clone + PartialEq + std::fmt::Debug;

    /// Action type - small and `Copy`.
    type Action: Copy + Eq + std::fmt::Debug;

    /// All actions available in `state`.
    ///
    /// Must be non-empty for every non-terminal state; planners treat an
    /// empty action set as a broken environment contract.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Generative simulator: sample one transition from `(state, action)`.
    ///
    /// `state` is advanced in place to the sampled successor. Returns the
    /// immediate reward and whether the successor is terminal. Stochastic
    /// elements draw from `rng`, so a seeded generator reproduces runs.
    fn step(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        rng: &mut ChaCha20Rng,
    ) -> (f64, bool);

    /// Full-width expansion: every outcome of `(state, action)` with its
    /// reward and probability.
    ///
    /// The returned list is ordered and covers the complete distribution;
    /// every successor `step` can sample appears in it.
    fn expand(&self, state: &Self::State, action: Self::Action) -> Vec<Outcome<Self::State>>;

    /// Enumerate the entire state space.
    ///
    /// Used only by full-width planners and exhaustive solve modes.
    fn list_states(&self) -> Vec<Self::State>;

    /// Whether `state` is terminal.
    fn is_terminal(&self, state: &Self::State) -> bool;
}
