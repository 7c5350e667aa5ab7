//! Value iteration over the full-width MDP interface.
//!
//! A straightforward fixed-point sweep: for every state, back up the best
//! expected one-step lookahead through [`Mdp::expand`] until no state value
//! moves by more than the configured tolerance. Operates against the same
//! environment contract as the UCT planner but needs the enumerable side of
//! it (`list_states`, `expand`) rather than the generative simulator.

use mdp_core::Mdp;
use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;
use tracing::{debug, info};

/// Configuration for value iteration.
#[derive(Debug, Clone, Copy)]
pub struct ViConfig {
    /// Discount factor applied to future rewards. Must lie in (0, 1).
    pub discount: f64,

    /// Convergence criterion: sweeps stop once the largest per-state value
    /// change drops to this level.
    pub tolerance: f64,
}

impl Default for ViConfig {
    fn default() -> Self {
        Self {
            discount: 0.95,
            tolerance: 1e-4,
        }
    }
}

impl ViConfig {
    /// Builder pattern: set the discount factor.
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    /// Builder pattern: set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Errors that can occur while planning.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },

    #[error("environment exposes no states")]
    EmptyStateSpace,

    #[error("state has no legal actions")]
    NoActions,
}

/// One value-iteration session over an environment.
#[derive(Debug)]
pub struct ValueIteration<'a, M: Mdp>
where
    M::State: Eq + Hash,
{
    mdp: &'a M,
    config: ViConfig,
    states: Vec<M::State>,
    values: HashMap<M::State, f64>,
}

impl<'a, M: Mdp> ValueIteration<'a, M>
where
    M::State: Eq + Hash,
{
    /// Create a session with all state values at zero.
    pub fn new(mdp: &'a M, config: ViConfig) -> Result<Self, PlanError> {
        if !(config.discount.is_finite() && config.discount > 0.0 && config.discount < 1.0) {
            return Err(PlanError::InvalidConfig {
                msg: "discount must lie in (0, 1)",
            });
        }
        if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
            return Err(PlanError::InvalidConfig {
                msg: "tolerance must be finite and > 0",
            });
        }

        let states = mdp.list_states();
        if states.is_empty() {
            return Err(PlanError::EmptyStateSpace);
        }

        let values = states.iter().map(|s| (s.clone(), 0.0)).collect();
        Ok(Self {
            mdp,
            config,
            states,
            values,
        })
    }

    /// Sweep until convergence; returns the number of sweeps performed.
    pub fn plan(&mut self) -> Result<u32, PlanError> {
        let mut iterations = 0;

        loop {
            let mut delta: f64 = 0.0;

            // In-place (Gauss-Seidel) updates: later states in the same
            // sweep already see earlier updates.
            for i in 0..self.states.len() {
                let state = self.states[i].clone();
                let best = self.best_outcome(&state)?;

                let previous = self.values[&state];
                self.values.insert(state, best);
                delta = delta.max((previous - best).abs());
            }

            iterations += 1;
            debug!(iterations, delta, "value iteration sweep");

            if delta <= self.config.tolerance {
                break;
            }
        }

        info!(iterations, "value iteration converged");
        Ok(iterations)
    }

    /// Current value estimate of `state`.
    pub fn value(&self, state: &M::State) -> Option<f64> {
        self.values.get(state).copied()
    }

    /// Expected return of taking `action` in `state` under the current
    /// value estimates: sum over outcomes of p * (r + discount * V(s')).
    pub fn q_value(&self, state: &M::State, action: M::Action) -> f64 {
        self.mdp
            .expand(state, action)
            .iter()
            .map(|o| {
                let value = self.values.get(&o.state).copied().unwrap_or(0.0);
                o.probability * (o.reward + self.config.discount * value)
            })
            .sum()
    }

    /// Greedy policy under the current values: for every state, the action
    /// with the best expected outcome (first maximum wins).
    pub fn policy(&self) -> Result<Vec<(M::State, M::Action)>, PlanError> {
        let mut policy = Vec::with_capacity(self.states.len());

        for state in &self.states {
            let actions = self.mdp.actions(state);
            let mut best: Option<(M::Action, f64)> = None;
            for action in actions {
                let q = self.q_value(state, action);
                if best.map_or(true, |(_, best_q)| q > best_q) {
                    best = Some((action, q));
                }
            }
            let (action, _) = best.ok_or(PlanError::NoActions)?;
            policy.push((state.clone(), action));
        }

        Ok(policy)
    }

    fn best_outcome(&self, state: &M::State) -> Result<f64, PlanError> {
        let actions = self.mdp.actions(state);
        if actions.is_empty() {
            return Err(PlanError::NoActions);
        }
        Ok(actions
            .into_iter()
            .map(|a| self.q_value(state, a))
            .fold(f64::NEG_INFINITY, f64::max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdp_core::Outcome;
    use rand_chacha::ChaCha20Rng;

    /// Deterministic corridor with an absorbing goal at the right end:
    /// optimal values are computable by hand.
    #[derive(Debug)]
    struct Corridor {
        len: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Dir {
        Left,
        Right,
    }

    impl Mdp for Corridor {
        type State = usize;
        type Action = Dir;

        fn actions(&self, _state: &usize) -> Vec<Dir> {
            vec![Dir::Left, Dir::Right]
        }

        fn step(&self, _: &mut usize, _: Dir, _: &mut ChaCha20Rng) -> (f64, bool) {
            unreachable!("value iteration never samples")
        }

        fn expand(&self, state: &usize, action: Dir) -> Vec<Outcome<usize>> {
            if self.is_terminal(state) {
                // Absorbing goal.
                return vec![Outcome {
                    state: *state,
                    reward: 0.0,
                    probability: 1.0,
                }];
            }
            let next = match action {
                Dir::Left => state.saturating_sub(1),
                Dir::Right => (*state + 1).min(self.len - 1),
            };
            let reward = if next == self.len - 1 { 10.0 } else { -1.0 };
            vec![Outcome {
                state: next,
                reward,
                probability: 1.0,
            }]
        }

        fn list_states(&self) -> Vec<usize> {
            (0..self.len).collect()
        }

        fn is_terminal(&self, state: &usize) -> bool {
            *state == self.len - 1
        }
    }

    #[test]
    fn converges_to_hand_computed_values() {
        let env = Corridor { len: 3 };
        let config = ViConfig::default().with_discount(0.9).with_tolerance(1e-9);
        let mut vi = ValueIteration::new(&env, config).unwrap();
        let iterations = vi.plan().unwrap();
        assert!(iterations >= 2);

        // V(2) = 0 (absorbing), V(1) = 10 (step into goal),
        // V(0) = -1 + 0.9 * 10 = 8.
        assert!((vi.value(&2).unwrap() - 0.0).abs() < 1e-6);
        assert!((vi.value(&1).unwrap() - 10.0).abs() < 1e-6);
        assert!((vi.value(&0).unwrap() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn policy_points_at_the_goal() {
        let env = Corridor { len: 4 };
        let mut vi = ValueIteration::new(&env, ViConfig::default()).unwrap();
        vi.plan().unwrap();

        let policy = vi.policy().unwrap();
        for (state, action) in policy {
            if !env.is_terminal(&state) {
                assert_eq!(action, Dir::Right, "state {state} should move right");
            }
        }
    }

    #[test]
    fn q_value_weights_outcomes_by_probability() {
        /// Coin-flip environment: one action, two equally likely outcomes.
        struct Coin;
        impl Mdp for Coin {
            type State = u8;
            type Action = u8;
            fn actions(&self, _: &u8) -> Vec<u8> {
                vec![0]
            }
            fn step(&self, _: &mut u8, _: u8, _: &mut ChaCha20Rng) -> (f64, bool) {
                unreachable!()
            }
            fn expand(&self, _: &u8, _: u8) -> Vec<Outcome<u8>> {
                vec![
                    Outcome {
                        state: 1,
                        reward: 4.0,
                        probability: 0.5,
                    },
                    Outcome {
                        state: 2,
                        reward: -2.0,
                        probability: 0.5,
                    },
                ]
            }
            fn list_states(&self) -> Vec<u8> {
                vec![0, 1, 2]
            }
            fn is_terminal(&self, state: &u8) -> bool {
                *state != 0
            }
        }

        let vi = ValueIteration::new(&Coin, ViConfig::default()).unwrap();
        // All values are zero before planning, so q is the expected reward.
        assert!((vi.q_value(&0, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_state_space_is_rejected() {
        #[derive(Debug)]
        struct Nothing;
        impl Mdp for Nothing {
            type State = u8;
            type Action = u8;
            fn actions(&self, _: &u8) -> Vec<u8> {
                vec![0]
            }
            fn step(&self, _: &mut u8, _: u8, _: &mut ChaCha20Rng) -> (f64, bool) {
                unreachable!()
            }
            fn expand(&self, _: &u8, _: u8) -> Vec<Outcome<u8>> {
                Vec::new()
            }
            fn list_states(&self) -> Vec<u8> {
                Vec::new()
            }
            fn is_terminal(&self, _: &u8) -> bool {
                false
            }
        }

        let err = ValueIteration::new(&Nothing, ViConfig::default()).unwrap_err();
        assert!(matches!(err, PlanError::EmptyStateSpace));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let env = Corridor { len: 3 };
        for discount in [0.0, 1.0, -0.5] {
            let config = ViConfig::default().with_discount(discount);
            let err = ValueIteration::new(&env, config).unwrap_err();
            assert!(matches!(err, PlanError::InvalidConfig { .. }));
        }
        let config = ViConfig::default().with_tolerance(0.0);
        assert!(ValueIteration::new(&env, config).is_err());
    }

    #[test]
    fn maze_policy_approaches_the_goal_on_open_grids() {
        use envs_gridmaze::{Maze, MazeConfig};
        use rand::SeedableRng;

        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let maze = Maze::new(MazeConfig::new(3, 3), &mut rng);

        let mut vi = ValueIteration::new(&maze, ViConfig::default()).unwrap();
        vi.plan().unwrap();

        for (state, action) in vi.policy().unwrap() {
            if maze.is_terminal(&state) {
                continue;
            }
            let mut next = state;
            maze.step(&mut next, action, &mut rng);
            assert!(
                next.manhattan(&maze.goal()) < state.manhattan(&maze.goal()),
                "policy action {action:?} at {state} does not approach the goal"
            );
        }
    }
}
