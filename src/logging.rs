//! Diagnostics sink for configuration resolution.
//!
//! Every non-fatal failure during load, override resolution and validation is
//! reported through a [`Diagnostics`] owned by the store. Each record goes to
//! two places:
//! - tracing (stderr/file, whatever subscriber the host installed)
//! - an in-memory buffer the owner drains with [`Diagnostics::take`]

use crate::error::{ConfigError, ErrorCode};
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};
use tracing::Level;

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Atomic level filter shared between sinks.
///
/// The level is stored as a u8: 0=Debug, 1=Info, 2=Warning, 3=Error.
pub struct LogLevelFilter(AtomicU8);

impl LogLevelFilter {
    /// Create a new filter with the given minimum level.
    pub fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level_to_u8(level)))
    }

    /// Get the current minimum level.
    pub fn get(&self) -> LogLevel {
        u8_to_level(self.0.load(Ordering::Relaxed))
    }

    /// Set the minimum level.
    pub fn set(&self, level: LogLevel) {
        self.0.store(level_to_u8(level), Ordering::Relaxed);
    }

    /// Check if a message at the given level should be logged.
    pub fn should_log(&self, level: LogLevel) -> bool {
        level_to_u8(level) >= self.0.load(Ordering::Relaxed)
    }
}

impl Default for LogLevelFilter {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

fn level_to_u8(level: LogLevel) -> u8 {
    match level {
        LogLevel::Debug => 0,
        LogLevel::Info => 1,
        LogLevel::Warning => 2,
        LogLevel::Error => 3,
    }
}

fn u8_to_level(val: u8) -> LogLevel {
    match val {
        0 => LogLevel::Debug,
        1 => LogLevel::Info,
        2 => LogLevel::Warning,
        3 => LogLevel::Error,
        _ => LogLevel::Debug,
    }
}

/// Convert a diagnostic level to a tracing Level.
pub fn log_level_to_tracing(level: LogLevel) -> Level {
    match level {
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warning => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// One retained diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: LogLevel,
    /// Set when the record was produced from a [`ConfigError`].
    pub code: Option<ErrorCode>,
    pub message: String,
}

/// Diagnostics sink owned by a configuration store.
///
/// Created together with the store and drained by whoever owns the store.
pub struct Diagnostics {
    level_filter: Arc<LogLevelFilter>,
    name: Option<String>,
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            level_filter: Arc::new(LogLevelFilter::default()),
            name: None,
            records: Vec::new(),
        }
    }

    /// Set the level filter.
    pub fn with_level_filter(mut self, filter: Arc<LogLevelFilter>) -> Self {
        self.level_filter = filter;
        self
    }

    /// Set the logger name attached to every tracing event.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Record a message.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push(level, None, message.into());
    }

    /// Record a [`ConfigError`] that was handled rather than returned.
    pub fn report(&mut self, level: LogLevel, err: &ConfigError) {
        self.push(level, Some(err.code()), err.to_string());
    }

    pub fn debug(&mut self, msg: impl Into<String>) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        self.log(LogLevel::Info, msg);
    }

    pub fn warning(&mut self, msg: impl Into<String>) {
        self.log(LogLevel::Warning, msg);
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.log(LogLevel::Error, msg);
    }

    /// Records retained since the last [`take`](Self::take).
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Drain the retained records.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records)
    }

    fn push(&mut self, level: LogLevel, code: Option<ErrorCode>, message: String) {
        if !self.level_filter.should_log(level) {
            return;
        }

        match log_level_to_tracing(level) {
            Level::ERROR => match self.name {
                Some(ref name) => tracing::error!(logger = %name, code = ?code, "{}", message),
                None => tracing::error!(code = ?code, "{}", message),
            },
            Level::WARN => match self.name {
                Some(ref name) => tracing::warn!(logger = %name, code = ?code, "{}", message),
                None => tracing::warn!(code = ?code, "{}", message),
            },
            Level::INFO => match self.name {
                Some(ref name) => tracing::info!(logger = %name, "{}", message),
                None => tracing::info!("{}", message),
            },
            _ => match self.name {
                Some(ref name) => tracing::debug!(logger = %name, "{}", message),
                None => tracing::debug!("{}", message),
            },
        }

        self.records.push(Diagnostic {
            level,
            code,
            message,
        });
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("level", &self.level_filter.get())
            .field("name", &self.name)
            .field("records", &self.records.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        let filter = LogLevelFilter::new(LogLevel::Warning);

        assert!(!filter.should_log(LogLevel::Debug));
        assert!(!filter.should_log(LogLevel::Info));
        assert!(filter.should_log(LogLevel::Warning));
        assert!(filter.should_log(LogLevel::Error));
    }

    #[test]
    fn test_level_filter_update() {
        let filter = LogLevelFilter::new(LogLevel::Debug);
        assert!(filter.should_log(LogLevel::Debug));

        filter.set(LogLevel::Error);
        assert!(!filter.should_log(LogLevel::Debug));
        assert!(!filter.should_log(LogLevel::Warning));
        assert!(filter.should_log(LogLevel::Error));
    }

    #[test]
    fn test_level_roundtrip() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Error,
        ] {
            let filter = LogLevelFilter::new(level);
            assert_eq!(filter.get(), level);
        }
    }

    #[test]
    fn test_report_retains_code() {
        let mut diagnostics = Diagnostics::new().with_name("config");
        diagnostics.report(LogLevel::Warning, &ConfigError::not_found("api_key"));
        diagnostics.info("loaded");

        let records = diagnostics.take();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, Some(ErrorCode::NotFound));
        assert_eq!(records[0].message, "config key not found: api_key");
        assert_eq!(records[1].code, None);
        assert!(diagnostics.records().is_empty());
    }

    #[test]
    fn test_filtered_records_are_dropped() {
        let filter = Arc::new(LogLevelFilter::new(LogLevel::Warning));
        let mut diagnostics = Diagnostics::new().with_level_filter(Arc::clone(&filter));
        diagnostics.debug("noise");
        diagnostics.error("kept");
        assert_eq!(diagnostics.records().len(), 1);

        filter.set(LogLevel::Debug);
        diagnostics.debug("now kept");
        assert_eq!(diagnostics.records().len(), 2);
    }
}
