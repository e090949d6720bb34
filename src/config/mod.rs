//! Layered configuration.
//!
//! Values resolve from three sources, highest precedence first:
//! 1. **Environment** - `<prefix><KEY>` for every bound key, matched onto
//!    nested keys by underscore namespaces
//! 2. **File** - the first `<search path>/<conf_name>` found
//! 3. **Defaults** - compiled in via `set_default`
//!
//! ## Environment Variables
//! - `DD_CONF_PATH` - extra directory searched for the configuration file
//! - `DD_<KEY>` / `DD_<KEY>_<NESTED>` - override of any bound key

mod defaults;
mod loader;
mod merge;
mod namespace;
mod overrides;
mod store;
mod validate;

pub use defaults::init_agent_defaults;
pub use loader::{FileSource, SearchPaths, YamlFileSource, parse_yaml_mapping};
pub use merge::{merge_over_defaults, resolve_entry};
pub use namespace::namespaces;
pub use store::{CONF_PATH_KEY, Config, DEFAULT_CONF_NAME, DEFAULT_ENV_PREFIX, KeyPath};
pub use validate::{
    HISTOGRAM_AGGREGATES_KEY, HISTOGRAM_PERCENTILES_KEY, VALID_AGGREGATES, truncate_to_hundredths,
};
