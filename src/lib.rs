//! Agent Configuration Library
//!
//! Layered configuration for the agent: a discovered YAML file, compiled-in
//! defaults and environment variable overrides resolved onto nested keys,
//! plus aggregation of per-check configuration fragments.

pub mod checks;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod format;
pub mod logging;
