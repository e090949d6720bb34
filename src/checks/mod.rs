//! Check configuration aggregation.
//!
//! Providers hand back configuration fragments per check. Fragments are
//! opaque here: they are only compared for equality so that repeated
//! collection never stores the same fragment twice.

mod file;

pub use file::FileConfigProvider;

use crate::error::{ConfigError, Result};
use crate::logging::Diagnostics;
use serde_json::Value;
use std::collections::BTreeMap;

/// Fragments per check name.
pub type CheckFragments = BTreeMap<String, Vec<Value>>;

/// Fragments per provider source, then per check name.
pub type CheckConfigs = BTreeMap<String, CheckFragments>;

/// Anything that can supply check configuration fragments.
///
/// Problems that do not stop collection go to `diagnostics`.
pub trait ConfigProvider: Send {
    fn collect(&self, diagnostics: &mut Diagnostics) -> CheckFragments;
}

impl<F> ConfigProvider for F
where
    F: Fn() -> CheckFragments + Send,
{
    fn collect(&self, _diagnostics: &mut Diagnostics) -> CheckFragments {
        self()
    }
}

/// Registered providers and everything collected from them so far.
#[derive(Default)]
pub struct CheckConfigCollector {
    providers: BTreeMap<String, Box<dyn ConfigProvider>>,
    configs: CheckConfigs,
}

impl CheckConfigCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `source`.
    ///
    /// Fails when the source name is blank or already taken.
    pub fn register(
        &mut self,
        source: &str,
        provider: impl ConfigProvider + 'static,
    ) -> Result<()> {
        if source.trim().is_empty() {
            return Err(ConfigError::invalid_provider(source, "source name is empty"));
        }
        if self.providers.contains_key(source) {
            return Err(ConfigError::invalid_provider(
                source,
                "a provider is already registered for this source",
            ));
        }
        self.providers.insert(source.to_string(), Box::new(provider));
        Ok(())
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Ask every provider for its fragments and append the new ones.
    pub fn collect_all(&mut self, diagnostics: &mut Diagnostics) {
        for (source, provider) in &self.providers {
            let collected = provider.collect(diagnostics);
            let known = self.configs.entry(source.clone()).or_default();
            for (check, fragments) in collected {
                let current = known.entry(check).or_default();
                for fragment in fragments {
                    // Skip what an earlier call already stored.
                    if !current.contains(&fragment) {
                        current.push(fragment);
                    }
                }
            }
        }
    }

    pub fn configs(&self) -> &CheckConfigs {
        &self.configs
    }
}

impl std::fmt::Debug for CheckConfigCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckConfigCollector")
            .field("sources", &self.providers.keys().collect::<Vec<_>>())
            .field("configs", &self.configs)
            .finish()
    }
}
