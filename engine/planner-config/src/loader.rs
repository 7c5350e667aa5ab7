//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable
//! overrides. Configuration problems are never fatal: anything missing,
//! malformed or unknown is reported and replaced by defaults.

use crate::PlannerConfig;
use std::path::Path;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a subdirectory)
];

/// Known sections and keys; anything else in the file draws a warning.
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("common", &["log_level"]),
    (
        "maze",
        &[
            "rows",
            "cols",
            "traps",
            "p_trap",
            "start_row",
            "start_col",
            "goal_row",
            "goal_col",
            "step_reward",
            "bump_reward",
            "trap_reward",
            "goal_reward",
        ],
    ),
    ("uct", &["discount", "exploration"]),
    ("vi", &["tolerance"]),
    (
        "experiment",
        &[
            "min_sims",
            "max_sims",
            "num_steps",
            "num_runs",
            "seed",
            "output_file",
        ],
    ),
];

/// Load the planner configuration from config.toml.
///
/// Searches in the following order:
/// 1. Path specified by the PLANNER_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> PlannerConfig {
    // Check for an explicit config path
    if let Ok(path) = std::env::var("PLANNER_CONFIG") {
        let path = Path::new(&path);
        if path.exists() {
            info!("Loading config from PLANNER_CONFIG: {}", path.display());
            return load_from_path(path);
        }
        warn!(
            "PLANNER_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(PlannerConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> PlannerConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            warn_unknown_keys(&content, path);
            match toml::from_str(&content) {
                Ok(config) => apply_env_overrides(config),
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    apply_env_overrides(PlannerConfig::default())
                }
            }
        }
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(PlannerConfig::default())
        }
    }
}

/// Report unrecognized sections and keys (non-fatal).
fn warn_unknown_keys(content: &str, path: &Path) {
    let Ok(value) = content.parse::<toml::Table>() else {
        return; // parse errors are reported by the deserializer
    };

    for (section, entry) in &value {
        let Some(known) = KNOWN_KEYS
            .iter()
            .find(|(name, _)| *name == section.as_str())
            .map(|(_, keys)| *keys)
        else {
            warn!(
                "{}: \"{}\" is not a valid section",
                path.display(),
                section
            );
            continue;
        };

        if let Some(table) = entry.as_table() {
            for key in table.keys() {
                if !known.contains(&key.as_str()) {
                    warn!(
                        "{}: \"{}.{}\" is not a valid parameter",
                        path.display(),
                        section,
                        key
                    );
                }
            }
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (usize, u32, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Optional parseable field (Option<usize>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: PLANNER_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: PlannerConfig) -> PlannerConfig {
    // Common
    env_override!(config, common.log_level, "PLANNER_COMMON_LOG_LEVEL");

    // Maze
    env_override!(config, maze.rows, "PLANNER_MAZE_ROWS", parse);
    env_override!(config, maze.cols, "PLANNER_MAZE_COLS", parse);
    env_override!(config, maze.traps, "PLANNER_MAZE_TRAPS", parse);
    env_override!(config, maze.p_trap, "PLANNER_MAZE_P_TRAP", parse);
    env_override!(config, maze.start_row, "PLANNER_MAZE_START_ROW", parse);
    env_override!(config, maze.start_col, "PLANNER_MAZE_START_COL", parse);
    env_override!(
        config,
        maze.goal_row,
        "PLANNER_MAZE_GOAL_ROW",
        optional_parse
    );
    env_override!(
        config,
        maze.goal_col,
        "PLANNER_MAZE_GOAL_COL",
        optional_parse
    );
    env_override!(config, maze.step_reward, "PLANNER_MAZE_STEP_REWARD", parse);
    env_override!(config, maze.bump_reward, "PLANNER_MAZE_BUMP_REWARD", parse);
    env_override!(config, maze.trap_reward, "PLANNER_MAZE_TRAP_REWARD", parse);
    env_override!(config, maze.goal_reward, "PLANNER_MAZE_GOAL_REWARD", parse);

    // UCT
    env_override!(config, uct.discount, "PLANNER_UCT_DISCOUNT", parse);
    env_override!(config, uct.exploration, "PLANNER_UCT_EXPLORATION", parse);

    // VI
    env_override!(config, vi.tolerance, "PLANNER_VI_TOLERANCE", parse);

    // Experiment
    env_override!(config, experiment.min_sims, "PLANNER_EXPERIMENT_MIN_SIMS", parse);
    env_override!(config, experiment.max_sims, "PLANNER_EXPERIMENT_MAX_SIMS", parse);
    env_override!(
        config,
        experiment.num_steps,
        "PLANNER_EXPERIMENT_NUM_STEPS",
        parse
    );
    env_override!(
        config,
        experiment.num_runs,
        "PLANNER_EXPERIMENT_NUM_RUNS",
        parse
    );
    env_override!(config, experiment.seed, "PLANNER_EXPERIMENT_SEED", parse);
    env_override!(config, experiment.output_file, "PLANNER_EXPERIMENT_OUTPUT_FILE");

    config
}
