//! Runner configuration: CLI surface plus resolution against config.toml.
//!
//! The problem definition (maze shape, planner parameters) lives in
//! config.toml with PLANNER_* environment overrides; the experiment surface
//! can additionally be adjusted per invocation from the command line. CLI
//! arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use envs_gridmaze::{GridPos, MazeConfig, Rewards};
use planner_config::{load_config, load_from_path, PlannerConfig};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use uct::UctConfig;
use value_iteration::ViConfig;

use crate::experiment::ExperimentParams;

/// Which planning algorithm drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlannerKind {
    /// Online Monte-Carlo tree search with UCB1 (the experiment protocol).
    Uct,
    /// Offline value iteration (prints the converged policy grid).
    Vi,
}

#[derive(Parser, Debug)]
#[command(name = "runner")]
#[command(about = "UCT and value-iteration planner for grid-maze MDPs")]
#[command(
    long_about = "Runs planning experiments over a grid-maze MDP.

The problem definition is loaded from config.toml (or the file given with
--input-file) with PLANNER_* environment variable overrides; command-line
arguments take highest priority."
)]
pub struct Cli {
    /// Problem specification file (defaults to the config.toml search paths)
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Summary output file (tab-separated; a .json snapshot lands next to it)
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Minimum simulation-budget exponent (2^n simulations per search)
    #[arg(long)]
    pub min_sims: Option<u32>,

    /// Maximum simulation-budget exponent
    #[arg(long)]
    pub max_sims: Option<u32>,

    /// Maximum steps before an episode is cut off
    #[arg(long)]
    pub num_steps: Option<u32>,

    /// Number of episodes per simulation-budget level
    #[arg(long)]
    pub runs: Option<u32>,

    /// Seed for the run's random generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Verbosity level (0 = warnings, 1 = progress, 2 = per-step detail)
    #[arg(long)]
    pub verbose: Option<u8>,

    /// Planning algorithm to run
    #[arg(long, value_enum, default_value_t = PlannerKind::Uct)]
    pub planner: PlannerKind,

    /// Solve mode: run UCT from every state with this simulation count and
    /// print the resulting policy grid
    #[arg(long, value_name = "SIMS")]
    pub solve: Option<u32>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub maze: MazeConfig,
    pub uct: UctConfig,
    pub vi: ViConfig,
    pub experiment: ExperimentParams,
    pub seed: u64,
    pub output_file: PathBuf,
    pub log_level: String,
    pub planner: PlannerKind,
    pub solve: Option<u32>,
}

impl Settings {
    /// Load the file configuration and merge the CLI on top.
    pub fn resolve(cli: &Cli) -> Self {
        let config = match &cli.input_file {
            Some(path) => load_from_path(path),
            None => load_config(),
        };
        Self::from_config(cli, config)
    }

    /// Merge an already-loaded configuration with CLI overrides.
    pub fn from_config(cli: &Cli, config: PlannerConfig) -> Self {
        let maze = MazeConfig {
            rows: config.maze.rows,
            cols: config.maze.cols,
            traps: config.maze.traps,
            p_trap: config.maze.p_trap,
            start: GridPos::new(config.maze.start_row, config.maze.start_col),
            goal: GridPos::new(
                config.maze.goal_row_or_default(),
                config.maze.goal_col_or_default(),
            ),
            rewards: Rewards {
                step: config.maze.step_reward,
                bump: config.maze.bump_reward,
                trap: config.maze.trap_reward,
                goal: config.maze.goal_reward,
            },
        };

        let uct = UctConfig::default()
            .with_discount(config.uct.discount)
            .with_exploration(config.uct.exploration);

        let vi = ViConfig::default()
            .with_discount(config.uct.discount)
            .with_tolerance(config.vi.tolerance);

        let experiment = ExperimentParams {
            min_sims: cli.min_sims.unwrap_or(config.experiment.min_sims),
            max_sims: cli.max_sims.unwrap_or(config.experiment.max_sims),
            num_steps: cli.num_steps.unwrap_or(config.experiment.num_steps),
            num_runs: cli.runs.unwrap_or(config.experiment.num_runs),
        };

        let log_level = match cli.verbose {
            Some(0) => "warn".to_string(),
            Some(1) => "info".to_string(),
            Some(2) => "debug".to_string(),
            Some(_) => "trace".to_string(),
            None => config.common.log_level.clone(),
        };

        Self {
            maze,
            uct,
            vi,
            experiment,
            seed: cli.seed.unwrap_or(config.experiment.seed),
            output_file: cli
                .output_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.experiment.output_file)),
            log_level,
            planner: cli.planner,
            solve: cli.solve,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.maze.rows == 0 || self.maze.cols == 0 {
            return Err(anyhow!("maze must have at least one row and column"));
        }
        if self.maze.start.row >= self.maze.rows || self.maze.start.col >= self.maze.cols {
            return Err(anyhow!("start {} lies off the grid", self.maze.start));
        }
        if self.maze.goal.row >= self.maze.rows || self.maze.goal.col >= self.maze.cols {
            return Err(anyhow!("goal {} lies off the grid", self.maze.goal));
        }
        if !(0.0..=1.0).contains(&self.maze.p_trap) {
            return Err(anyhow!(
                "p_trap {} must lie in [0, 1]",
                self.maze.p_trap
            ));
        }
        if !(self.uct.discount > 0.0 && self.uct.discount < 1.0) {
            return Err(anyhow!(
                "discount {} must lie in (0, 1)",
                self.uct.discount
            ));
        }
        if self.uct.exploration < 0.0 {
            return Err(anyhow!("exploration must be non-negative"));
        }
        if self.experiment.min_sims > self.experiment.max_sims {
            return Err(anyhow!(
                "min_sims {} exceeds max_sims {}",
                self.experiment.min_sims,
                self.experiment.max_sims
            ));
        }
        if self.experiment.max_sims > 20 {
            return Err(anyhow!(
                "max_sims {} is unreasonably large (2^20 simulations per step is the cap)",
                self.experiment.max_sims
            ));
        }
        if self.experiment.num_steps == 0 {
            return Err(anyhow!("num_steps must be greater than 0"));
        }
        if self.experiment.num_runs == 0 {
            return Err(anyhow!("runs must be greater than 0"));
        }
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        let cli = Cli::parse_from(["runner"]);
        Settings::from_config(&cli, PlannerConfig::default())
    }

    #[test]
    fn defaults_resolve_and_validate() {
        let settings = base_settings();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.maze.rows, 6);
        assert_eq!(settings.maze.goal, GridPos::new(5, 5));
        assert_eq!(settings.experiment.min_sims, 2);
        assert_eq!(settings.experiment.max_sims, 10);
        assert_eq!(settings.seed, 0);
        assert_eq!(settings.planner, PlannerKind::Uct);
        assert_eq!(settings.output_file, PathBuf::from("results.tsv"));
    }

    #[test]
    fn cli_overrides_take_priority() {
        let cli = Cli::parse_from([
            "runner",
            "--min-sims",
            "3",
            "--max-sims",
            "5",
            "--runs",
            "7",
            "--seed",
            "42",
            "--output-file",
            "out.tsv",
        ]);
        let settings = Settings::from_config(&cli, PlannerConfig::default());

        assert_eq!(settings.experiment.min_sims, 3);
        assert_eq!(settings.experiment.max_sims, 5);
        assert_eq!(settings.experiment.num_runs, 7);
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.output_file, PathBuf::from("out.tsv"));
        // Untouched values still come from the file config.
        assert_eq!(settings.experiment.num_steps, 50);
    }

    #[test]
    fn verbosity_maps_to_log_levels() {
        for (verbose, level) in [(0u8, "warn"), (1, "info"), (2, "debug"), (3, "trace")] {
            let cli = Cli::parse_from(["runner", "--verbose", &verbose.to_string()]);
            let settings = Settings::from_config(&cli, PlannerConfig::default());
            assert_eq!(settings.log_level, level);
        }
    }

    #[test]
    fn planner_flag_selects_value_iteration() {
        let cli = Cli::parse_from(["runner", "--planner", "vi"]);
        let settings = Settings::from_config(&cli, PlannerConfig::default());
        assert_eq!(settings.planner, PlannerKind::Vi);
    }

    #[test]
    fn solve_flag_carries_its_budget() {
        let cli = Cli::parse_from(["runner", "--solve", "512"]);
        let settings = Settings::from_config(&cli, PlannerConfig::default());
        assert_eq!(settings.solve, Some(512));
    }

    #[test]
    fn validate_rejects_inverted_budget_range() {
        let mut settings = base_settings();
        settings.experiment.min_sims = 8;
        settings.experiment.max_sims = 4;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("min_sims"));
    }

    #[test]
    fn validate_rejects_bad_discount() {
        let mut settings = base_settings();
        settings.uct.discount = 1.0;
        assert!(settings.validate().is_err());

        settings.uct.discount = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_off_grid_goal() {
        let mut settings = base_settings();
        settings.maze.goal = GridPos::new(99, 0);
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("goal"));
    }

    #[test]
    fn validate_rejects_bad_trap_probability() {
        let mut settings = base_settings();
        settings.maze.p_trap = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_runs() {
        let mut settings = base_settings();
        settings.experiment.num_runs = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("runs"));
    }
}
