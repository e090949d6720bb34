//! Environment override resolution.
//!
//! A bound key such as `logs_config_batch_wait` is matched against the data
//! and defaults trees one level at a time. A key present as-is at the current
//! level is assigned directly; otherwise the [`namespaces`] splits are tried
//! in order. Every level that matches through a default is copied into the
//! data tree, so the override lands next to the other defaults of that mapping
//! and later reads see it as loaded data.

use super::namespace::namespaces;
use super::store::Config;
use crate::env::Env;
use crate::error::{ConfigError, Result};
use serde_json::{Map, Value};
use std::env::VarError;

impl Config {
    /// Resolve `key` against the trees and store the value of `env_var` there.
    ///
    /// On failure the data tree is left as it was.
    pub fn env_override(&mut self, env_var: &str, key: &str) -> Result<()> {
        let request = OverrideRequest {
            env: &self.env,
            env_var,
        };
        request.resolve(&mut self.data, Some(&self.defaults), key, &[])
    }
}

struct OverrideRequest<'a> {
    env: &'a Env,
    env_var: &'a str,
}

/// What [`materialize`] did to the data node, so a failed descent can undo it.
enum Materialized {
    Untouched,
    Inserted,
    ReplacedNull,
}

impl OverrideRequest<'_> {
    /// `data` and `defaults` are the nodes reached by following `path` from
    /// the roots of both trees.
    fn resolve(
        &self,
        data: &mut Map<String, Value>,
        defaults: Option<&Map<String, Value>>,
        key: &str,
        path: &[String],
    ) -> Result<()> {
        // Empty and absent subtrees are the same thing here.
        if data.is_empty() && defaults.is_none_or(Map::is_empty) {
            return Err(self.fail(format!(
                "key prefix {} unavailable in configurations",
                display_path(path)
            )));
        }

        // The exact key comes first; descending into `A.B` for `A_B` only
        // happens when `A_B` is not itself a key at this level.
        let candidates = std::iter::once((key, "")).chain(
            namespaces(key)
                .into_iter()
                .filter(|(_, suffix)| !suffix.is_empty()),
        );

        let mut last_err = None;
        for (prefix, suffix) in candidates {
            let default_entry = defaults.and_then(|d| d.get(prefix));
            if !data.contains_key(prefix) && default_entry.is_none() {
                continue;
            }

            let materialized = materialize(data, prefix, default_entry);

            let outcome = if suffix.is_empty() {
                self.read_value().map(|value| {
                    data.insert(prefix.to_string(), Value::String(value));
                })
            } else {
                let mut child_path = path.to_vec();
                child_path.push(prefix.to_string());
                let child_defaults = default_entry.and_then(Value::as_object);
                match data.get_mut(prefix).and_then(Value::as_object_mut) {
                    Some(child) => self.resolve(child, child_defaults, suffix, &child_path),
                    None => Err(self.fail(format!(
                        "{} is not a mapping in the loaded configuration",
                        display_path(&child_path)
                    ))),
                }
            };

            match outcome {
                Ok(()) => return Ok(()),
                Err(err) => {
                    rollback(data, prefix, materialized);
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            self.fail(format!(
                "no configuration key matches {} under {}",
                key,
                display_path(path)
            ))
        }))
    }

    fn read_value(&self) -> Result<String> {
        self.env.var(self.env_var).map_err(|err| match err {
            VarError::NotPresent => self.fail("variable is not set"),
            VarError::NotUnicode(_) => self.fail("value is not valid unicode"),
        })
    }

    fn fail(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::unresolvable(self.env_var, reason)
    }
}

/// Copy the default for `prefix` into `data` when the data tree has no
/// usable value there.
fn materialize(
    data: &mut Map<String, Value>,
    prefix: &str,
    default_entry: Option<&Value>,
) -> Materialized {
    let Some(default) = default_entry else {
        return Materialized::Untouched;
    };
    match data.get_mut(prefix) {
        None => {
            data.insert(prefix.to_string(), default.clone());
            Materialized::Inserted
        }
        Some(slot) if slot.is_null() => {
            *slot = default.clone();
            Materialized::ReplacedNull
        }
        Some(_) => Materialized::Untouched,
    }
}

fn rollback(data: &mut Map<String, Value>, prefix: &str, materialized: Materialized) {
    match materialized {
        Materialized::Untouched => {}
        Materialized::Inserted => {
            data.remove(prefix);
        }
        Materialized::ReplacedNull => {
            data.insert(prefix.to_string(), Value::Null);
        }
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
