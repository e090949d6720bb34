//! Configuration file discovery and the load pipeline.
//!
//! `load()` runs three stages in order:
//! 1. **File** - the first search path containing the configuration file
//!    replaces the data tree
//! 2. **Environment** - every bound key is checked for an override
//! 3. **Validation** - derived settings are normalized
//!
//! An override of `conf_path` (or a pre-seeded `conf_path` when no file was
//! found) triggers one extra pass that looks in that directory first.

use super::store::{CONF_PATH_KEY, Config};
use crate::error::{ConfigError, Result};
use crate::logging::LogLevel;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Reads configuration files from disk (or anywhere else).
pub trait FileSource: Send {
    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Read and parse the file at `path` into a mapping.
    fn read(&self, path: &Path) -> Result<Map<String, Value>>;
}

/// YAML file source backed by `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFileSource;

impl FileSource for YamlFileSource {
    fn read(&self, path: &Path) -> Result<Map<String, Value>> {
        // The file handle is closed when read_to_string returns.
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        parse_yaml_mapping(&content, path)
    }
}

/// Parse YAML text whose top level must be a mapping.
///
/// An empty document is an empty mapping.
pub fn parse_yaml_mapping(content: &str, path: &Path) -> Result<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    let value: Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::malformed(path, e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(ConfigError::malformed(
            path,
            format!("top level must be a mapping, found {}", type_name(&other)),
        )),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Ordered, duplicate-free list of directories to search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths(Vec<PathBuf>);

impl SearchPaths {
    /// Append `path` unless it is already present. Returns whether it was added.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.0.contains(&path) {
            return false;
        }
        self.0.push(path);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First `<dir>/<file_name>` that exists, trying `preferred` before the
    /// registered directories.
    pub fn find(
        &self,
        file_name: &str,
        preferred: Option<&Path>,
        source: &dyn FileSource,
    ) -> Option<PathBuf> {
        preferred
            .into_iter()
            .chain(self.iter())
            .map(|dir| dir.join(file_name))
            .find(|candidate| source.exists(candidate))
    }
}

impl Config {
    /// Load the configuration file, apply environment overrides and validate.
    ///
    /// Missing or unreadable files are reported through the diagnostics sink;
    /// the store then serves whatever data it already had plus defaults.
    ///
    /// When nothing was loaded, or `conf_path` was overridden from the
    /// environment, one more pass runs with `conf_path` appended to the search
    /// paths. That pass looks in `conf_path` before every other search path,
    /// unlike the first one, which keeps insertion order.
    pub fn load(&mut self) {
        self.load_pass(None);
    }

    fn load_pass(&mut self, reentry: Option<PathBuf>) {
        let first_pass = reentry.is_none();
        let mut loaded = self.load_file(reentry.as_deref());

        let conf_path_var = format!("{}{}", self.env_prefix, CONF_PATH_KEY).to_uppercase();
        let bindings: Vec<String> = self.env_bindings.iter().cloned().collect();
        for binding in bindings {
            let Some(env_var) = self.bound_env_var(&binding) else {
                continue;
            };

            match self.env_override(&env_var, &binding) {
                Ok(()) => self
                    .diagnostics
                    .debug(format!("applied environment override {}", env_var)),
                Err(err) => self.diagnostics.report(LogLevel::Warning, &err),
            }

            if env_var.to_uppercase() == conf_path_var {
                // The configured location changed; the file found above may be the wrong one.
                loaded = false;
            }
        }

        if !loaded && first_pass {
            if let Some(conf_path) = self.conf_path() {
                self.diagnostics.info(format!(
                    "reloading configuration with {} = {}",
                    CONF_PATH_KEY,
                    conf_path.display()
                ));
                self.add_search_path(conf_path.clone());
                self.load_pass(Some(conf_path));
                return;
            }
        }

        self.validate();
    }

    /// Variable name that overrides `binding`: the exact `<prefix><key>`
    /// first, then its upper-cased form.
    fn bound_env_var(&self, binding: &str) -> Option<String> {
        let exact = format!("{}{}", self.env_prefix, binding);
        if self.env.contains(&exact) {
            return Some(exact);
        }
        let upper = exact.to_uppercase();
        if self.env.contains(&upper) {
            return Some(upper);
        }
        None
    }

    fn conf_path(&self) -> Option<PathBuf> {
        match self.get(CONF_PATH_KEY) {
            Ok(Value::String(path)) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => None,
        }
    }

    /// Install the first configuration file found as the data tree.
    fn load_file(&mut self, preferred: Option<&Path>) -> bool {
        let found = self
            .search_paths
            .find(&self.conf_name, preferred, self.file_source.as_ref());

        let Some(path) = found else {
            let mut searched: Vec<PathBuf> = preferred.map(Path::to_path_buf).into_iter().collect();
            searched.extend(
                self.search_paths
                    .iter()
                    .filter(|dir| Some(*dir) != preferred)
                    .map(Path::to_path_buf),
            );
            let err = ConfigError::FileNotFound {
                conf_name: self.conf_name.clone(),
                searched,
            };
            self.diagnostics.report(LogLevel::Error, &err);
            return false;
        };

        match self.file_source.read(&path) {
            Ok(data) => {
                self.data = data;
                self.diagnostics
                    .info(format!("loaded config from: {}", path.display()));
                self.loaded_config = Some(path);
                true
            }
            Err(err) => {
                self.diagnostics.report(LogLevel::Error, &err);
                false
            }
        }
    }
}
