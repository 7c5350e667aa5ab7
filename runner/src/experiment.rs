//! Experiment driver: a budget-doubling sweep of episodes.
//!
//! For every simulation-budget exponent in range, runs a batch of episodes,
//! aggregates their returns and timing, and emits one summary row per
//! budget level.

use anyhow::{ensure, Result};
use indicatif::{ProgressBar, ProgressStyle};
use mdp_core::Mdp;
use rand_chacha::ChaCha20Rng;
use tracing::info;
use uct::UctConfig;

use crate::episode::run_episode;
use crate::stats::{Results, SummaryRow};

/// Experiment protocol parameters.
#[derive(Debug, Clone, Copy)]
pub struct ExperimentParams {
    /// Minimum simulation-budget exponent; budget is 2^exponent.
    pub min_sims: u32,
    /// Maximum simulation-budget exponent (inclusive).
    pub max_sims: u32,
    /// Step limit per episode.
    pub num_steps: u32,
    /// Episodes per budget level.
    pub num_runs: u32,
}

/// Run the full sweep and return one summary row per budget level.
pub fn run_experiment<M: Mdp>(
    mdp: &M,
    start: M::State,
    config: UctConfig,
    params: ExperimentParams,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<SummaryRow>> {
    ensure!(
        params.min_sims <= params.max_sims,
        "min_sims {} exceeds max_sims {}",
        params.min_sims,
        params.max_sims
    );
    ensure!(params.num_runs > 0, "num_runs must be positive");
    ensure!(params.num_steps > 0, "num_steps must be positive");

    let levels = params.max_sims - params.min_sims + 1;
    let progress = ProgressBar::new(u64::from(levels * params.num_runs));
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} episodes {msg}")
            .expect("progress template is static"),
    );

    let mut rows = Vec::with_capacity(levels as usize);
    let mut results = Results::new();

    for exponent in params.min_sims..=params.max_sims {
        let simulations = 1u32 << exponent;
        results.clear();
        progress.set_message(format!("({simulations} sims)"));

        info!(simulations, runs = params.num_runs, "starting budget level");

        for run in 0..params.num_runs {
            let outcome = run_episode(
                mdp,
                start.clone(),
                config,
                simulations,
                params.num_steps,
                rng,
            )?;

            info!(
                run,
                simulations,
                steps = outcome.steps,
                terminated = outcome.terminated,
                undiscounted = outcome.undiscounted_return,
                discounted = outcome.discounted_return,
                "episode finished"
            );

            results.record(
                outcome.undiscounted_return,
                outcome.discounted_return,
                outcome.duration,
            );
            progress.inc(1);
        }

        let row = results.summarize(simulations);
        info!(
            simulations,
            mean_undiscounted = row.undiscounted_mean,
            se_undiscounted = row.undiscounted_se,
            mean_discounted = row.discounted_mean,
            se_discounted = row.discounted_se,
            mean_duration_secs = row.mean_duration_secs,
            "budget level complete"
        );
        rows.push(row);
    }

    progress.finish_and_clear();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use envs_gridmaze::{Maze, MazeConfig};
    use rand::SeedableRng;

    fn tiny_maze() -> Maze {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        Maze::new(MazeConfig::new(2, 2), &mut rng)
    }

    #[test]
    fn one_row_per_budget_level() {
        let maze = tiny_maze();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let params = ExperimentParams {
            min_sims: 1,
            max_sims: 3,
            num_steps: 10,
            num_runs: 2,
        };

        let rows = run_experiment(
            &maze,
            maze.start(),
            UctConfig::for_testing(),
            params,
            &mut rng,
        )
        .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].simulations, 2);
        assert_eq!(rows[1].simulations, 4);
        assert_eq!(rows[2].simulations, 8);
        for row in &rows {
            assert_eq!(row.runs, 2);
            assert!(row.mean_duration_secs >= 0.0);
        }
    }

    #[test]
    fn results_reset_between_levels() {
        // With num_runs = 1, every row must report exactly one run; stale
        // accumulation would inflate the count.
        let maze = tiny_maze();
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let params = ExperimentParams {
            min_sims: 0,
            max_sims: 2,
            num_steps: 5,
            num_runs: 1,
        };

        let rows = run_experiment(
            &maze,
            maze.start(),
            UctConfig::for_testing(),
            params,
            &mut rng,
        )
        .unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.runs == 1));
    }

    #[test]
    fn inverted_budget_range_is_rejected() {
        let maze = tiny_maze();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let params = ExperimentParams {
            min_sims: 5,
            max_sims: 2,
            num_steps: 5,
            num_runs: 1,
        };

        let err = run_experiment(
            &maze,
            maze.start(),
            UctConfig::for_testing(),
            params,
            &mut rng,
        )
        .unwrap_err();
        assert!(err.to_string().contains("min_sims"));
    }
}
