//! Compiled-in agent defaults.
//!
//! Every leaf registered here is also bound to its environment variable, so
//! `DD_LOGS_CONFIG_BATCH_WAIT` overrides `logs_config.batch_wait` without any
//! further setup.

use super::store::Config;
use super::validate::{HISTOGRAM_AGGREGATES_KEY, HISTOGRAM_PERCENTILES_KEY};
use serde_json::json;

/// Register the agent's defaults and environment bindings on `config`.
pub fn init_agent_defaults(config: &mut Config) {
    // Core
    config.bind_env_and_set_default("conf_path", "conf_path", ".");
    config.bind_env_and_set_default("confd_path", "confd_path", "conf.d");
    config.bind_env_and_set_default("additional_checksd", "additional_checksd", "checks.d");
    config.bind_env_and_set_default("api_key", "api_key", "");
    config.bind_env_and_set_default("site", "site", "datadoghq.com");
    config.bind_env_and_set_default("dd_url", "dd_url", "https://app.datadoghq.com");
    config.bind_env_and_set_default("hostname", "hostname", "");
    config.bind_env_and_set_default("tags", "tags", json!([]));
    config.bind_env_and_set_default("log_level", "log_level", "info");

    // Aggregator
    config.bind_env_and_set_default(
        HISTOGRAM_AGGREGATES_KEY,
        HISTOGRAM_AGGREGATES_KEY,
        json!(["max", "median", "avg", "count"]),
    );
    config.bind_env_and_set_default(
        HISTOGRAM_PERCENTILES_KEY,
        HISTOGRAM_PERCENTILES_KEY,
        json!(["0.95"]),
    );
    config.bind_env_and_set_default("aggregator_interval", "aggregator_interval", 15);

    // Forwarder
    config.bind_env_and_set_default("forwarder_timeout", "forwarder_timeout", 20);
    config.bind_env_and_set_default(
        "forwarder",
        "forwarder",
        json!({
            "num_workers": 4,
            "retry_queue_max_size": 30,
        }),
    );

    // Logs agent
    config.bind_env_and_set_default("logs_enabled", "logs_enabled", false);
    config.bind_env_and_set_default(
        "logs_config",
        "logs_config",
        json!({
            "dd_url": "agent-intake.logs.datadoghq.com",
            "dd_port": 10516,
            "dev_mode_use_proto": false,
            "run_path": "/opt/datadog-agent/run",
            "open_files_limit": 100,
            "batch_wait": 5,
        }),
    );

    // Proxy
    config.bind_env_and_set_default(
        "proxy",
        "proxy",
        json!({
            "http": "",
            "https": "",
            "no_proxy": [],
        }),
    );
}
