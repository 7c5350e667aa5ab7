//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from the defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_rows() -> usize {
    defaults::rows()
}
fn d_cols() -> usize {
    defaults::cols()
}
fn d_traps() -> usize {
    defaults::traps()
}
fn d_p_trap() -> f64 {
    defaults::p_trap()
}
fn d_start_row() -> usize {
    defaults::start_row()
}
fn d_start_col() -> usize {
    defaults::start_col()
}
fn d_step_reward() -> f64 {
    defaults::step_reward()
}
fn d_bump_reward() -> f64 {
    defaults::bump_reward()
}
fn d_trap_reward() -> f64 {
    defaults::trap_reward()
}
fn d_goal_reward() -> f64 {
    defaults::goal_reward()
}
fn d_discount() -> f64 {
    defaults::discount()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_tolerance() -> f64 {
    defaults::tolerance()
}
fn d_min_sims() -> u32 {
    defaults::min_sims()
}
fn d_max_sims() -> u32 {
    defaults::max_sims()
}
fn d_num_steps() -> u32 {
    defaults::num_steps()
}
fn d_num_runs() -> u32 {
    defaults::num_runs()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_output_file() -> String {
    defaults::output_file().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlannerConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub maze: MazeSection,
    #[serde(default)]
    pub uct: UctSection,
    #[serde(default)]
    pub vi: ViSection,
    #[serde(default)]
    pub experiment: ExperimentSection,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Problem definition: grid shape, traps and reward distribution
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MazeSection {
    #[serde(default = "d_rows")]
    pub rows: usize,
    #[serde(default = "d_cols")]
    pub cols: usize,
    #[serde(default = "d_traps")]
    pub traps: usize,
    #[serde(default = "d_p_trap")]
    pub p_trap: f64,
    #[serde(default = "d_start_row")]
    pub start_row: usize,
    #[serde(default = "d_start_col")]
    pub start_col: usize,
    /// Goal location; defaults to the bottom-right corner when omitted.
    #[serde(default)]
    pub goal_row: Option<usize>,
    #[serde(default)]
    pub goal_col: Option<usize>,
    #[serde(default = "d_step_reward")]
    pub step_reward: f64,
    #[serde(default = "d_bump_reward")]
    pub bump_reward: f64,
    #[serde(default = "d_trap_reward")]
    pub trap_reward: f64,
    #[serde(default = "d_goal_reward")]
    pub goal_reward: f64,
}

impl MazeSection {
    /// Goal row with the bottom-right default applied.
    pub fn goal_row_or_default(&self) -> usize {
        self.goal_row.unwrap_or(self.rows - 1)
    }

    /// Goal column with the bottom-right default applied.
    pub fn goal_col_or_default(&self) -> usize {
        self.goal_col.unwrap_or(self.cols - 1)
    }
}

impl Default for MazeSection {
    fn default() -> Self {
        Self {
            rows: defaults::rows(),
            cols: defaults::cols(),
            traps: defaults::traps(),
            p_trap: defaults::p_trap(),
            start_row: defaults::start_row(),
            start_col: defaults::start_col(),
            goal_row: None,
            goal_col: None,
            step_reward: defaults::step_reward(),
            bump_reward: defaults::bump_reward(),
            trap_reward: defaults::trap_reward(),
            goal_reward: defaults::goal_reward(),
        }
    }
}

/// UCT search configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UctSection {
    #[serde(default = "d_discount")]
    pub discount: f64,
    #[serde(default = "d_exploration")]
    pub exploration: f64,
}

impl Default for UctSection {
    fn default() -> Self {
        Self {
            discount: defaults::discount(),
            exploration: defaults::exploration(),
        }
    }
}

/// Value-iteration configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ViSection {
    #[serde(default = "d_tolerance")]
    pub tolerance: f64,
}

impl Default for ViSection {
    fn default() -> Self {
        Self {
            tolerance: defaults::tolerance(),
        }
    }
}

/// Experiment protocol configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExperimentSection {
    /// Minimum simulation-budget exponent (2^n simulations per search).
    #[serde(default = "d_min_sims")]
    pub min_sims: u32,
    /// Maximum simulation-budget exponent.
    #[serde(default = "d_max_sims")]
    pub max_sims: u32,
    /// Step limit per episode.
    #[serde(default = "d_num_steps")]
    pub num_steps: u32,
    /// Episodes per simulation-budget level.
    #[serde(default = "d_num_runs")]
    pub num_runs: u32,
    /// Seed for the run's random generator.
    #[serde(default = "d_seed")]
    pub seed: u64,
    /// Tab-separated summary output path.
    #[serde(default = "d_output_file")]
    pub output_file: String,
}

impl Default for ExperimentSection {
    fn default() -> Self {
        Self {
            min_sims: defaults::min_sims(),
            max_sims: defaults::max_sims(),
            num_steps: defaults::num_steps(),
            num_runs: defaults::num_runs(),
            seed: defaults::seed(),
            output_file: defaults::output_file().into(),
        }
    }
}
