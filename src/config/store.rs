//! Layered configuration store.
//!
//! Two parallel trees back every read:
//! - **data**: values loaded from the configuration file or written by
//!   environment overrides and [`Config::set`]
//! - **defaults**: compiled-in fallbacks registered before [`Config::load`]

use super::loader::{FileSource, SearchPaths, YamlFileSource};
use super::merge::resolve_entry;
use crate::checks::{CheckConfigCollector, CheckConfigs, ConfigProvider};
use crate::env::Env;
use crate::error::{ConfigError, Result};
use crate::logging::{Diagnostic, Diagnostics};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File name looked up in every search path.
pub const DEFAULT_CONF_NAME: &str = "datadog.yaml";

/// Prefix shared by all bound environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "DD_";

/// Key whose value names an extra directory to look for the configuration file.
pub const CONF_PATH_KEY: &str = "conf_path";

/// Address of a value in the defaults tree: a single key or a path of
/// nested keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        Self(vec![key.to_string()])
    }
}

impl From<String> for KeyPath {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for KeyPath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

/// Layered configuration store.
pub struct Config {
    pub(super) conf_name: String,
    pub(super) env_prefix: String,
    pub(super) search_paths: SearchPaths,
    pub(super) env_bindings: BTreeSet<String>,
    pub(super) data: Map<String, Value>,
    pub(super) defaults: Map<String, Value>,
    pub(super) loaded_config: Option<PathBuf>,
    pub(super) env: Env,
    pub(super) file_source: Box<dyn FileSource>,
    pub(super) diagnostics: Diagnostics,
    checks: CheckConfigCollector,
}

impl Config {
    pub fn new(conf_name: impl Into<String>, env_prefix: impl Into<String>) -> Self {
        Self {
            conf_name: conf_name.into(),
            env_prefix: env_prefix.into(),
            search_paths: SearchPaths::default(),
            env_bindings: BTreeSet::new(),
            data: Map::new(),
            defaults: Map::new(),
            loaded_config: None,
            env: Env::real(),
            file_source: Box::new(YamlFileSource),
            diagnostics: Diagnostics::new().with_name("config"),
            checks: CheckConfigCollector::new(),
        }
    }

    /// Replace the environment collaborator.
    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    /// Replace the file source used by [`Config::load`].
    pub fn with_file_source(mut self, source: impl FileSource + 'static) -> Self {
        self.file_source = Box::new(source);
        self
    }

    /// Replace the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn conf_name(&self) -> &str {
        &self.conf_name
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Read a key, merging mapping defaults under mapping data.
    pub fn get(&self, key: &str) -> Result<Value> {
        resolve_entry(self.data.get(key), self.defaults.get(key))
            .ok_or_else(|| ConfigError::not_found(key))
    }

    /// Read a key, returning `fallback` when it is absent from both trees.
    pub fn get_or(&self, key: &str, fallback: Value) -> Value {
        self.get(key).unwrap_or(fallback)
    }

    /// Read a key and deserialize it.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.get(key)?;
        serde_json::from_value(value).map_err(|source| ConfigError::InvalidType {
            key: key.to_string(),
            source,
        })
    }

    /// Overwrite a key in the data tree.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    /// Remove a key from the data tree. Later reads fall back to its default.
    pub fn delete(&mut self, key: &str) -> Result<Value> {
        self.data
            .remove(key)
            .ok_or_else(|| ConfigError::not_found(key))
    }

    /// Set a compiled-in default, creating intermediate mappings as needed.
    ///
    /// An intermediate segment that currently holds a non-mapping value is
    /// replaced by an empty mapping.
    pub fn set_default(&mut self, path: impl Into<KeyPath>, value: impl Into<Value>) {
        let path = path.into();
        let Some((leaf, parents)) = path.segments().split_last() else {
            return;
        };

        let mut node = &mut self.defaults;
        for segment in parents {
            let entry = node
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            node = match entry {
                Value::Object(map) => map,
                _ => unreachable!("intermediate default was just made a mapping"),
            };
        }
        node.insert(leaf.clone(), value.into());
    }

    /// Make `key` eligible for environment overrides.
    pub fn bind_env(&mut self, key: impl Into<String>) {
        self.env_bindings.insert(key.into());
    }

    /// Register a default and bind its environment key.
    ///
    /// A mapping value is not stored as one default: each entry is bound
    /// recursively as `<key>_<entry>` at `path + [entry]`.
    pub fn bind_env_and_set_default(
        &mut self,
        key: &str,
        path: impl Into<KeyPath>,
        value: impl Into<Value>,
    ) {
        let path = path.into();
        match value.into() {
            Value::Object(entries) => {
                for (entry, value) in entries {
                    let child_key = format!("{}_{}", key, entry);
                    self.bind_env_and_set_default(&child_key, path.child(&entry), value);
                }
            }
            leaf => {
                self.bind_env(key);
                self.set_default(path, leaf);
            }
        }
    }

    pub fn env_bindings(&self) -> &BTreeSet<String> {
        &self.env_bindings
    }

    /// Append a directory to the search paths unless already present.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.add(path);
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    /// Location of the configuration file used by the last load.
    pub fn loaded_config(&self) -> Option<&Path> {
        self.loaded_config.as_deref()
    }

    /// The data tree as loaded and overridden.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The compiled-in defaults tree.
    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Every key visible through [`Config::get`], resolved.
    pub fn all_settings(&self) -> Map<String, Value> {
        let keys: BTreeSet<&String> = self.data.keys().chain(self.defaults.keys()).collect();
        keys.into_iter()
            .filter_map(|key| {
                resolve_entry(self.data.get(key), self.defaults.get(key))
                    .map(|value| (key.clone(), value))
            })
            .collect()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Drain the diagnostics recorded so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    /// Register a check-config provider under `source`.
    pub fn add_provider(
        &mut self,
        source: &str,
        provider: impl ConfigProvider + 'static,
    ) -> Result<()> {
        self.checks.register(source, provider)
    }

    /// Collect fragments from every registered provider.
    pub fn collect_check_configs(&mut self) {
        self.checks.collect_all(&mut self.diagnostics);
    }

    pub fn check_configs(&self) -> &CheckConfigs {
        self.checks.configs()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CONF_NAME, DEFAULT_ENV_PREFIX)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("conf_name", &self.conf_name)
            .field("env_prefix", &self.env_prefix)
            .field("search_paths", &self.search_paths)
            .field("env_bindings", &self.env_bindings)
            .field("loaded_config", &self.loaded_config)
            .field("data", &self.data)
            .field("defaults", &self.defaults)
            .finish()
    }
}
