//! Structured error types for configuration resolution.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Lookup errors
    NotFound,
    InvalidType,

    // Registration errors
    InvalidProvider,

    // Load errors (logged, never fatal to `load`)
    FileNotFound,
    ReadFile,
    MalformedFile,
    UnresolvableOverride,

    // Validation errors (logged per element)
    InvalidAggregateValue,
    InvalidPercentileValue,

    // Provider errors
    AmbiguousCheckSource,
}

/// Errors raised or logged while building and querying a [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config key not found: {key}")]
    NotFound { key: String },

    #[error("config key {key} has an unexpected type: {source}")]
    InvalidType {
        key: String,
        source: serde_json::Error,
    },

    #[error("invalid provider for source '{source_name}': {reason}")]
    InvalidProvider { source_name: String, reason: String },

    #[error("could not find {conf_name} in search paths: {}", format_paths(.searched))]
    FileNotFound {
        conf_name: String,
        searched: Vec<PathBuf>,
    },

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {reason}")]
    MalformedFile { path: PathBuf, reason: String },

    #[error("unable to override {env_var}: {reason}")]
    UnresolvableOverride { env_var: String, reason: String },

    #[error("ignored histogram aggregate {value}: {reason}")]
    InvalidAggregateValue { value: String, reason: String },

    #[error("bad histogram percentile value {value}: {reason}")]
    InvalidPercentileValue { value: String, reason: String },

    #[error("check '{check}' is defined both as a file and a directory in {dir}")]
    AmbiguousCheckSource { check: String, dir: PathBuf },
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::NotFound { .. } => ErrorCode::NotFound,
            ConfigError::InvalidType { .. } => ErrorCode::InvalidType,
            ConfigError::InvalidProvider { .. } => ErrorCode::InvalidProvider,
            ConfigError::FileNotFound { .. } => ErrorCode::FileNotFound,
            ConfigError::ReadFile { .. } => ErrorCode::ReadFile,
            ConfigError::MalformedFile { .. } => ErrorCode::MalformedFile,
            ConfigError::UnresolvableOverride { .. } => ErrorCode::UnresolvableOverride,
            ConfigError::InvalidAggregateValue { .. } => ErrorCode::InvalidAggregateValue,
            ConfigError::InvalidPercentileValue { .. } => ErrorCode::InvalidPercentileValue,
            ConfigError::AmbiguousCheckSource { .. } => ErrorCode::AmbiguousCheckSource,
        }
    }

    // Convenience constructors

    pub fn not_found(key: &str) -> Self {
        ConfigError::NotFound {
            key: key.to_string(),
        }
    }

    pub fn unresolvable(env_var: &str, reason: impl Into<String>) -> Self {
        ConfigError::UnresolvableOverride {
            env_var: env_var.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_provider(source_name: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidProvider {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConfigError::MalformedFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(none)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
