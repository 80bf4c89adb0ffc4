//! Tracking run orchestration.
//!
//! This module provides:
//! - Configuration loading (`config`)
//! - Console prompts for the operator (`prompt`)
//! - The scroll-convergence loop (`convergence`)
//! - The full run from window focus to table update (`runner`)

pub mod config;
pub mod convergence;
pub mod prompt;
pub mod runner;

pub use config::{get_config, init_config};
pub use runner::{run_tracker, select_only};
