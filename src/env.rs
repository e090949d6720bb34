//! Environment variable abstraction.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`].
//! Tests use [`Env::from_vars()`] backed by a `HashMap`, so no test has to
//! mutate the process environment.

use std::collections::HashMap;
use std::env::VarError;

/// Read-only environment variable lookup, queried by exact name.
#[derive(Clone, Debug)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    pub fn from_vars(
        vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up an environment variable by name.
    pub fn var(&self, name: &str) -> Result<String, VarError> {
        match &self.overrides {
            Some(map) => map.get(name).cloned().ok_or(VarError::NotPresent),
            None => std::env::var(name),
        }
    }

    /// Returns `true` if the variable exists, even when its value is not
    /// valid unicode.
    pub fn contains(&self, name: &str) -> bool {
        !matches!(self.var(name), Err(VarError::NotPresent))
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_env_reads_cargo_manifest_dir() {
        let env = Env::real();
        assert!(env.var("CARGO_MANIFEST_DIR").is_ok());
    }

    #[test]
    fn mock_env_returns_set_values() {
        let env = Env::from_vars([("FOO", "bar"), ("BAZ", "qux")]);
        assert_eq!(env.var("FOO").unwrap(), "bar");
        assert_eq!(env.var("BAZ").unwrap(), "qux");
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let env = Env::from_vars([("DD_api_key", "x")]);
        assert!(env.contains("DD_api_key"));
        assert!(!env.contains("DD_API_KEY"));
    }

    #[test]
    fn mock_env_returns_not_present_for_missing() {
        let env = Env::from_vars(Vec::<(&str, &str)>::new());
        assert!(matches!(env.var("NONEXISTENT"), Err(VarError::NotPresent)));
        assert!(!env.contains("NONEXISTENT"));
    }
}
