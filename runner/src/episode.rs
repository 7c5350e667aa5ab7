//! Single planning episode: root a tree at the start state, alternate
//! search and real environment steps, and account returns.

use mdp_core::Mdp;
use rand_chacha::ChaCha20Rng;
use std::time::{Duration, Instant};
use tracing::debug;
use uct::{SearchError, UctConfig, UctSearch};

/// Outcome of one episode.
#[derive(Debug, Clone)]
pub struct EpisodeOutcome {
    pub undiscounted_return: f64,
    pub discounted_return: f64,
    pub steps: u32,
    /// True when the environment reported a terminal state before the step
    /// limit; false when the episode hit the limit.
    pub terminated: bool,
    pub duration: Duration,
}

/// Run one episode of up to `max_steps` steps from `start`.
///
/// A fresh tree is rooted (and expanded) at the start state. Each step runs
/// `simulations` simulations from the current node, commits the greedy
/// action against the real environment, and advances the current node to
/// the successor matching the observed outcome. The whole tree is dropped
/// when the episode ends.
pub fn run_episode<M: Mdp>(
    mdp: &M,
    start: M::State,
    config: UctConfig,
    simulations: u32,
    max_steps: u32,
    rng: &mut ChaCha20Rng,
) -> Result<EpisodeOutcome, SearchError> {
    let started = Instant::now();

    let mut state = start.clone();
    let mut search = UctSearch::new(mdp, config, start)?;
    let mut node = search.root();

    let mut undiscounted = 0.0;
    let mut discounted = 0.0;
    let mut discount = 1.0;
    let mut steps = 0;
    let mut terminated = false;

    for step in 0..max_steps {
        let action = search.search(node, simulations, rng)?;
        let (reward, terminal) = mdp.step(&mut state, action, rng);

        undiscounted += reward;
        discounted += reward * discount;
        discount *= config.discount;
        steps += 1;

        debug!(step, action = ?action, state = ?state, reward, "episode step");

        if terminal {
            terminated = true;
            break;
        }
        node = search.advance(node, action, &state)?;
    }

    Ok(EpisodeOutcome {
        undiscounted_return: undiscounted,
        discounted_return: discounted,
        steps,
        terminated,
        duration: started.elapsed(),
    })
}
