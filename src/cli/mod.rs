//! CLI command definitions for agent-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::{DEFAULT_CONF_NAME, DEFAULT_ENV_PREFIX};
use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Resolve and inspect agent configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file name looked up in each search path
    #[arg(long, default_value = DEFAULT_CONF_NAME, global = true)]
    pub conf_name: String,

    /// Prefix of environment variables that override configuration keys
    #[arg(long, default_value = DEFAULT_ENV_PREFIX, global = true)]
    pub env_prefix: String,

    /// Directory to search for the configuration file (repeatable, in order)
    #[arg(short, long = "search-path", value_name = "DIR", global = true)]
    pub search_paths: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration, or a single key (default if no subcommand given)
    Show {
        /// Key to print; all settings when omitted
        key: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Collect and print check configurations from conf.d directories
    Checks {
        /// conf.d directory to scan (repeatable); defaults to `confd_path`
        #[arg(short = 'd', long = "confd", value_name = "DIR")]
        confd: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}
