//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic shared by
//! the planner components.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`PLANNER_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (embedded from config.defaults.toml)
//!
//! Missing or malformed files and unknown keys are reported and skipped;
//! the process always continues with defaults for anything unspecified.
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! PLANNER_<SECTION>_<KEY>=value
//!
//! Examples:
//!     PLANNER_MAZE_ROWS=10
//!     PLANNER_UCT_DISCOUNT=0.9
//!     PLANNER_EXPERIMENT_NUM_RUNS=50
//! ```

mod defaults;
mod loader;
mod structs;

pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
