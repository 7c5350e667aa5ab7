//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so every binary carries
//! the same baseline regardless of its working directory.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    maze: MazeDefaults,
    uct: UctDefaults,
    vi: ViDefaults,
    experiment: ExperimentDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MazeDefaults {
    rows: usize,
    cols: usize,
    traps: usize,
    p_trap: f64,
    start_row: usize,
    start_col: usize,
    step_reward: f64,
    bump_reward: f64,
    trap_reward: f64,
    goal_reward: f64,
}

#[derive(Debug, Deserialize)]
struct UctDefaults {
    discount: f64,
    exploration: f64,
}

#[derive(Debug, Deserialize)]
struct ViDefaults {
    tolerance: f64,
}

#[derive(Debug, Deserialize)]
struct ExperimentDefaults {
    min_sims: u32,
    max_sims: u32,
    num_steps: u32,
    num_runs: u32,
    seed: u64,
    output_file: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Maze
pub fn rows() -> usize {
    DEFAULTS.maze.rows
}
pub fn cols() -> usize {
    DEFAULTS.maze.cols
}
pub fn traps() -> usize {
    DEFAULTS.maze.traps
}
pub fn p_trap() -> f64 {
    DEFAULTS.maze.p_trap
}
pub fn start_row() -> usize {
    DEFAULTS.maze.start_row
}
pub fn start_col() -> usize {
    DEFAULTS.maze.start_col
}
pub fn step_reward() -> f64 {
    DEFAULTS.maze.step_reward
}
pub fn bump_reward() -> f64 {
    DEFAULTS.maze.bump_reward
}
pub fn trap_reward() -> f64 {
    DEFAULTS.maze.trap_reward
}
pub fn goal_reward() -> f64 {
    DEFAULTS.maze.goal_reward
}

// UCT
pub fn discount() -> f64 {
    DEFAULTS.uct.discount
}
pub fn exploration() -> f64 {
    DEFAULTS.uct.exploration
}

// VI
pub fn tolerance() -> f64 {
    DEFAULTS.vi.tolerance
}

// Experiment
pub fn min_sims() -> u32 {
    DEFAULTS.experiment.min_sims
}
pub fn max_sims() -> u32 {
    DEFAULTS.experiment.max_sims
}
pub fn num_steps() -> u32 {
    DEFAULTS.experiment.num_steps
}
pub fn num_runs() -> u32 {
    DEFAULTS.experiment.num_runs
}
pub fn seed() -> u64 {
    DEFAULTS.experiment.seed
}
pub fn output_file() -> &'static str {
    &DEFAULTS.experiment.output_file
}
