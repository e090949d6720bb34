//! Integration tests for check configuration aggregation.

use agent_config::checks::{CheckFragments, FileConfigProvider};
use agent_config::config::Config;
use agent_config::error::ErrorCode;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn repeated_collection_across_providers_is_idempotent() {
    let confd = TempDir::new().unwrap();
    fs::write(
        confd.path().join("redis.yaml"),
        "init_config: {}\ninstances:\n  - host: localhost\n    port: 6379\n",
    )
    .unwrap();

    let mut config = Config::default();
    config
        .add_provider("file", FileConfigProvider::new([confd.path()]))
        .unwrap();
    config
        .add_provider("static", || {
            let mut fragments = CheckFragments::new();
            fragments.insert("redis".to_string(), vec![json!({"instances": [{"port": 6380}]})]);
            fragments
        })
        .unwrap();

    config.collect_check_configs();
    config.collect_check_configs();

    let configs = config.check_configs();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs["file"]["redis"].len(), 1);
    assert_eq!(
        configs["file"]["redis"][0]["instances"][0]["port"],
        json!(6379)
    );
    assert_eq!(configs["static"]["redis"].len(), 1);
}

#[test]
fn new_files_are_picked_up_on_the_next_collection() {
    let confd = TempDir::new().unwrap();
    fs::write(confd.path().join("disk.yaml"), "instances: [{use_mount: false}]\n").unwrap();

    let mut config = Config::default();
    config
        .add_provider("file", FileConfigProvider::new([confd.path()]))
        .unwrap();
    config.collect_check_configs();

    let nginx = confd.path().join("nginx.d");
    fs::create_dir(&nginx).unwrap();
    fs::write(nginx.join("conf.yaml"), "instances: [{nginx_status_url: x}]\n").unwrap();
    config.collect_check_configs();

    let file = &config.check_configs()["file"];
    assert_eq!(file["disk"].len(), 1);
    assert_eq!(file["nginx"].len(), 1);
}

#[test]
fn registration_rejects_blank_source() {
    let mut config = Config::default();
    let err = config
        .add_provider("", FileConfigProvider::default())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidProvider);
    assert!(config.check_configs().is_empty());
}

#[test]
fn ambiguous_check_is_kept_in_store_diagnostics() {
    let confd = TempDir::new().unwrap();
    fs::write(confd.path().join("redis.yaml"), "instances: []\n").unwrap();
    let redis = confd.path().join("redis.d");
    fs::create_dir(&redis).unwrap();
    fs::write(redis.join("conf.yaml"), "instances: []\n").unwrap();

    let mut config = Config::default();
    config
        .add_provider("file", FileConfigProvider::new([confd.path()]))
        .unwrap();
    config.collect_check_configs();

    assert!(!config.check_configs()["file"].contains_key("redis"));
    let codes: Vec<_> = config
        .take_diagnostics()
        .into_iter()
        .filter_map(|d| d.code)
        .collect();
    assert_eq!(codes, vec![ErrorCode::AmbiguousCheckSource]);
}
