//! UCB1 action selection.
//!
//! Scores every legal action at a node and picks the maximum. In exploring
//! mode the mean value is augmented with a confidence bonus and untried
//! actions are unconditionally preferred; greedy mode reads the mean alone.
//! Ties are broken uniformly at random over the whole tie set, so action
//! enumeration order carries no systematic bias.

use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::node::NodeId;
use crate::search::SearchError;
use crate::tree::SearchTree;

/// Pick an action index at `node` by UCB1.
///
/// Greedy mode: score = mean value.
/// Exploring mode: score = mean value
///   + `exploration` * sqrt(ln(total_visits + 1) / action_visits),
/// with untried actions scoring infinite.
pub fn select_action<S: Clone + PartialEq, A: Copy + Eq>(
    tree: &SearchTree<S, A>,
    node: NodeId,
    exploration: f64,
    greedy: bool,
    rng: &mut ChaCha20Rng,
) -> Result<usize, SearchError> {
    let node = tree.get(node);
    if node.actions().is_empty() {
        return Err(SearchError::NoActions);
    }

    let total_visits = node.visits();
    let mut best_score = f64::NEG_INFINITY;
    let mut best = Vec::new();

    for action in 0..node.actions().len() {
        let mut score = node.value(action);

        if !greedy {
            let action_visits = node.action_visits(action);
            if action_visits == 0 {
                // Untried actions always precede tried ones.
                score = f64::INFINITY;
            } else {
                let bonus = (f64::from(total_visits + 1).ln()
                    / f64::from(action_visits))
                .sqrt();
                score += exploration * bonus;
            }
        }

        if score >= best_score {
            if score > best_score {
                best.clear();
            }
            best_score = score;
            best.push(action);
        }
    }

    Ok(best[rng.gen_range(0..best.len())])
}
