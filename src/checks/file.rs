//! File-based check configuration provider.
//!
//! Scans `conf.d`-style directories:
//! - `<check>.d/*.yaml` - one fragment per file in the directory
//! - `<check>.yaml` - a single fragment
//!
//! A check that appears in both forms inside the same directory is
//! ambiguous and skipped for that directory. Skipped directories and files
//! are reported to the caller's [`Diagnostics`].

use super::{CheckFragments, ConfigProvider};
use crate::config::parse_yaml_mapping;
use crate::error::ConfigError;
use crate::logging::{Diagnostics, LogLevel};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Collects check fragments from YAML files on disk.
#[derive(Debug, Clone, Default)]
pub struct FileConfigProvider {
    dirs: Vec<PathBuf>,
}

impl FileConfigProvider {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Fragments found in one directory.
    fn scan_dir(&self, dir: &Path, diagnostics: &mut Diagnostics) -> CheckFragments {
        let mut from_dirs: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        let mut from_files: BTreeMap<String, PathBuf> = BTreeMap::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                diagnostics.debug(format!(
                    "skipping check config directory {}: {}",
                    dir.display(),
                    e
                ));
                return CheckFragments::new();
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if path.is_dir() {
                if let Some(check) = name.strip_suffix(".d") {
                    from_dirs.insert(check.to_string(), yaml_files_in(&path, diagnostics));
                }
            } else if let Some(check) = yaml_stem(name) {
                from_files.insert(check.to_string(), path);
            }
        }

        let mut fragments = CheckFragments::new();
        for (check, files) in from_dirs {
            if from_files.remove(&check).is_some() {
                let err = ConfigError::AmbiguousCheckSource {
                    check: check.clone(),
                    dir: dir.to_path_buf(),
                };
                diagnostics.report(LogLevel::Error, &err);
                continue;
            }
            let parsed: Vec<Value> = files
                .iter()
                .filter_map(|f| read_fragment(f, diagnostics))
                .collect();
            if !parsed.is_empty() {
                fragments.insert(check, parsed);
            }
        }
        for (check, file) in from_files {
            if let Some(fragment) = read_fragment(&file, diagnostics) {
                fragments.insert(check, vec![fragment]);
            }
        }
        fragments
    }
}

impl ConfigProvider for FileConfigProvider {
    fn collect(&self, diagnostics: &mut Diagnostics) -> CheckFragments {
        let mut collected = CheckFragments::new();
        for dir in &self.dirs {
            for (check, fragments) in self.scan_dir(dir, diagnostics) {
                collected.entry(check).or_default().extend(fragments);
            }
        }
        collected
    }
}

fn yaml_stem(name: &str) -> Option<&str> {
    name.strip_suffix(".yaml")
        .or_else(|| name.strip_suffix(".yml"))
        .filter(|stem| !stem.is_empty())
}

/// YAML files directly inside `dir`, sorted by name.
fn yaml_files_in(dir: &Path, diagnostics: &mut Diagnostics) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .and_then(yaml_stem)
                        .is_some()
            })
            .collect(),
        Err(e) => {
            diagnostics.warning(format!(
                "failed to list check config directory {}: {}",
                dir.display(),
                e
            ));
            Vec::new()
        }
    };
    files.sort();
    files
}

fn read_fragment(path: &Path, diagnostics: &mut Diagnostics) -> Option<Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) => {
            let err = ConfigError::ReadFile {
                path: path.to_path_buf(),
                source,
            };
            diagnostics.report(LogLevel::Warning, &err);
            return None;
        }
    };

    match parse_yaml_mapping(&content, path) {
        Ok(map) if map.is_empty() => None,
        Ok(map) => Some(Value::Object(map)),
        Err(err) => {
            diagnostics.report(LogLevel::Warning, &err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn collect(provider: &FileConfigProvider) -> (CheckFragments, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let collected = provider.collect(&mut diagnostics);
        (collected, diagnostics)
    }

    #[test]
    fn test_flat_and_directory_layouts() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("redis.yaml"), "instances:\n  - port: 6379\n").unwrap();
        let nginx = temp.path().join("nginx.d");
        fs::create_dir(&nginx).unwrap();
        fs::write(nginx.join("b.yaml"), "instances:\n  - url: b\n").unwrap();
        fs::write(nginx.join("a.yml"), "instances:\n  - url: a\n").unwrap();
        fs::write(nginx.join("notes.txt"), "ignored").unwrap();

        let (collected, _) = collect(&FileConfigProvider::new([temp.path()]));

        assert_eq!(collected["redis"], vec![json!({"instances": [{"port": 6379}]})]);
        assert_eq!(
            collected["nginx"],
            vec![
                json!({"instances": [{"url": "a"}]}),
                json!({"instances": [{"url": "b"}]})
            ]
        );
    }

    #[test]
    fn test_ambiguous_check_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("redis.yaml"), "instances: []\n").unwrap();
        let redis = temp.path().join("redis.d");
        fs::create_dir(&redis).unwrap();
        fs::write(redis.join("conf.yaml"), "instances: []\n").unwrap();
        fs::write(temp.path().join("disk.yaml"), "instances: []\n").unwrap();

        let (collected, mut diagnostics) = collect(&FileConfigProvider::new([temp.path()]));
        assert!(!collected.contains_key("redis"));
        assert!(collected.contains_key("disk"));

        let records = diagnostics.take();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Error);
        assert_eq!(records[0].code, Some(ErrorCode::AmbiguousCheckSource));
        assert!(records[0].message.contains("redis"));
    }

    #[test]
    fn test_fragments_accumulate_across_directories() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("disk.yaml"), "instances: [{a: 1}]\n").unwrap();
        fs::write(second.path().join("disk.yaml"), "instances: [{a: 2}]\n").unwrap();

        let (collected, _) = collect(&FileConfigProvider::new([first.path(), second.path()]));
        assert_eq!(collected["disk"].len(), 2);
    }

    #[test]
    fn test_broken_and_empty_files_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("broken.yaml"), "instances: [unclosed\n").unwrap();
        fs::write(temp.path().join("empty.yaml"), "").unwrap();

        let (collected, diagnostics) = collect(&FileConfigProvider::new([temp.path()]));
        assert!(collected.is_empty());
        let codes: Vec<_> = diagnostics.records().iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![Some(ErrorCode::MalformedFile)]);
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let (collected, diagnostics) = collect(&FileConfigProvider::new(["/definitely/not/here"]));
        assert!(collected.is_empty());
        assert_eq!(diagnostics.records()[0].level, LogLevel::Debug);
    }
}
