//! Whole-grid policy extraction: UCT solve mode and the value-iteration
//! planner, both rendered as a policy grid.

use anyhow::{Context, Result};
use envs_gridmaze::{GridPos, Maze, MazeAction};
use mdp_core::Mdp;
use rand_chacha::ChaCha20Rng;
use tracing::info;
use uct::{UctConfig, UctSearch};
use value_iteration::{ValueIteration, ViConfig};

/// Run UCT from every non-terminal state with a fixed simulation budget and
/// collect the greedy action per state.
pub fn solve_uct(
    maze: &Maze,
    config: UctConfig,
    simulations: u32,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<(GridPos, MazeAction)>> {
    let mut policy = Vec::new();

    for state in maze.list_states() {
        if maze.is_terminal(&state) {
            continue;
        }
        let mut search =
            UctSearch::new(maze, config, state).context("rooting search for solve mode")?;
        let action = search
            .search(search.root(), simulations, rng)
            .with_context(|| format!("solving state {state}"))?;
        policy.push((state, action));
    }

    info!(states = policy.len(), simulations, "solve sweep complete");
    Ok(policy)
}

/// Plan with value iteration and extract the greedy policy.
pub fn solve_value_iteration(
    maze: &Maze,
    config: ViConfig,
) -> Result<Vec<(GridPos, MazeAction)>> {
    let mut vi = ValueIteration::new(maze, config).context("creating value iteration")?;
    let iterations = vi.plan().context("running value iteration")?;
    info!(iterations, "value iteration finished");

    let policy = vi
        .policy()?
        .into_iter()
        .filter(|(state, _)| !maze.is_terminal(state))
        .collect();
    Ok(policy)
}

/// Render a policy as a grid of one-letter actions; the goal cell shows its
/// own marker.
pub fn render_policy(maze: &Maze, policy: &[(GridPos, MazeAction)]) -> String {
    let mut out = String::new();
    for row in 0..maze.rows() {
        for col in 0..maze.cols() {
            let pos = GridPos::new(row, col);
            let glyph = if maze.is_terminal(&pos) {
                'X'
            } else {
                policy
                    .iter()
                    .find(|(state, _)| *state == pos)
                    .map(|(_, action)| action.letter())
                    .unwrap_or('?')
            };
            out.push('[');
            out.push(glyph);
            out.push(']');
        }
        out.push('\n');
    }
    out
}
