//! Agent configuration CLI
//!
//! Loads the layered agent configuration the same way the agent does at
//! startup and prints the result.

use agent_config::checks::FileConfigProvider;
use agent_config::cli::{Cli, Command};
use agent_config::config::{Config, init_agent_defaults};
use agent_config::format::OutputFormat;
use agent_config::logging::{Diagnostics, LogLevel, LogLevelFilter};
use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

/// Default directories searched for the configuration file, in order.
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("datadog-agent"));
    }
    paths.push(PathBuf::from("/etc/datadog-agent"));
    paths
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let min_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let diagnostics = Diagnostics::new()
        .with_name("config")
        .with_level_filter(Arc::new(LogLevelFilter::new(min_level)));

    let mut config = Config::new(cli.conf_name.clone(), cli.env_prefix.clone())
        .with_diagnostics(diagnostics);
    init_agent_defaults(&mut config);

    let search_paths = if cli.search_paths.is_empty() {
        default_search_paths()
    } else {
        cli.search_paths.clone()
    };
    for path in search_paths {
        config.add_search_path(path);
    }

    config.load();
    // Everything was already forwarded to tracing.
    let flushed = config.take_diagnostics();
    debug!(count = flushed.len(), "configuration diagnostics flushed");

    let command = cli.command.unwrap_or(Command::Show {
        key: None,
        format: OutputFormat::default(),
    });

    let output = match command {
        Command::Show { key: Some(key), format } => format.render(&config.get(&key)?)?,
        Command::Show { key: None, format } => format.render(&config.all_settings())?,
        Command::Checks { confd, format } => {
            let dirs = if confd.is_empty() {
                vec![PathBuf::from(config.get_as::<String>("confd_path")?)]
            } else {
                confd
            };
            config.add_provider("file", FileConfigProvider::new(dirs))?;
            config.collect_check_configs();
            format.render(config.check_configs())?
        }
    };

    print!("{}", output);
    Ok(())
}
