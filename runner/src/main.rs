//! Runner - experiment driver for the grid-maze planners.
//!
//! A single process that:
//! 1. Loads the problem definition from config.toml (PLANNER_* overrides)
//! 2. Builds the maze MDP with a seeded generator
//! 3. Runs the selected planner: the UCT budget-doubling experiment (with a
//!    tab-separated summary table), a whole-grid UCT solve, or value
//!    iteration with a policy grid

use anyhow::Result;
use clap::Parser;
use envs_gridmaze::Maze;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::info;

mod config;
mod episode;
mod experiment;
mod report;
mod solve;
mod stats;

use crate::config::{Cli, PlannerKind, Settings};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(&cli);
    settings.validate()?;

    init_tracing(&settings.log_level)?;
    info!(log_level = %settings.log_level, seed = settings.seed, "runner starting");

    // Trap layout draws from its own stream so the maze shape depends only
    // on the seed, not on how many samples planning has consumed.
    let mut maze_rng = ChaCha20Rng::seed_from_u64(settings.seed);
    maze_rng.set_stream(1);
    let maze = Maze::new(settings.maze.clone(), &mut maze_rng);

    println!("Maze:");
    println!("{}", maze.render(Some(maze.start())));

    let mut rng = ChaCha20Rng::seed_from_u64(settings.seed);

    if let Some(simulations) = settings.solve {
        info!(simulations, "solve mode: UCT from every state");
        let policy = solve::solve_uct(&maze, settings.uct, simulations, &mut rng)?;
        println!("{}", solve::render_policy(&maze, &policy));
        return Ok(());
    }

    match settings.planner {
        PlannerKind::Vi => {
            let policy = solve::solve_value_iteration(&maze, settings.vi)?;
            println!("{}", solve::render_policy(&maze, &policy));
        }
        PlannerKind::Uct => {
            let rows = experiment::run_experiment(
                &maze,
                maze.start(),
                settings.uct,
                settings.experiment,
                &mut rng,
            )?;
            report::write_table(&settings.output_file, &rows)?;
            report::write_json_snapshot(&settings.output_file.with_extension("json"), &rows)?;
        }
    }

    info!("runner finished");
    Ok(())
}
