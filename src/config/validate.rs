//! Post-load normalization of histogram settings.
//!
//! Both validators only look at the data tree: defaults are trusted.

use super::loader::type_name;
use super::store::Config;
use crate::error::ConfigError;
use crate::logging::LogLevel;
use serde_json::Value;

pub const HISTOGRAM_AGGREGATES_KEY: &str = "histogram_aggregates";
pub const HISTOGRAM_PERCENTILES_KEY: &str = "histogram_percentiles";

/// Aggregates a histogram can report.
pub const VALID_AGGREGATES: [&str; 6] = ["min", "max", "median", "avg", "sum", "count"];

impl Config {
    /// Run every validator against the data tree.
    pub fn validate(&mut self) {
        self.validate_histogram_aggregates();
        self.validate_histogram_percentiles();
    }

    /// Keep only the known aggregate names, trimmed, in their original order.
    pub fn validate_histogram_aggregates(&mut self) {
        let Some(configured) = self.data.get(HISTOGRAM_AGGREGATES_KEY) else {
            return;
        };
        if is_unset(configured) {
            return;
        }
        let Value::Array(items) = configured else {
            let err = ConfigError::InvalidAggregateValue {
                value: configured.to_string(),
                reason: format!("{} should be a list - ignoring", HISTOGRAM_AGGREGATES_KEY),
            };
            self.diagnostics.report(LogLevel::Error, &err);
            self.data.remove(HISTOGRAM_AGGREGATES_KEY);
            return;
        };

        let mut result = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();
        for item in items {
            match item.as_str().map(str::trim) {
                Some(name) if VALID_AGGREGATES.contains(&name) => {
                    result.push(Value::String(name.to_string()));
                }
                Some(name) => rejected.push(ConfigError::InvalidAggregateValue {
                    value: name.to_string(),
                    reason: "invalid".to_string(),
                }),
                None => rejected.push(ConfigError::InvalidAggregateValue {
                    value: item.to_string(),
                    reason: format!("expected a string, found {}", type_name(item)),
                }),
            }
        }

        for err in &rejected {
            self.diagnostics.report(LogLevel::Warning, err);
        }
        self.data
            .insert(HISTOGRAM_AGGREGATES_KEY.to_string(), Value::Array(result));
    }

    /// Keep percentiles in `]0;1[`, truncated to two decimals.
    ///
    /// An element that is not a number at all aborts validation and empties
    /// the list. Booleans count as 1 and 0, so they are only out of range.
    pub fn validate_histogram_percentiles(&mut self) {
        let Some(configured) = self.data.get(HISTOGRAM_PERCENTILES_KEY) else {
            return;
        };
        if is_unset(configured) {
            return;
        }
        let Value::Array(items) = configured else {
            let err = ConfigError::InvalidPercentileValue {
                value: configured.to_string(),
                reason: format!("{} should be a list - ignoring", HISTOGRAM_PERCENTILES_KEY),
            };
            self.diagnostics.report(LogLevel::Error, &err);
            self.data.remove(HISTOGRAM_PERCENTILES_KEY);
            return;
        };

        let mut result = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();
        let mut aborted = None;
        for item in items {
            match parse_percentile(item) {
                Ok(percentile) => result.push(Value::from(percentile)),
                Err(PercentileError::OutOfRange(err)) => rejected.push(err),
                Err(PercentileError::NotNumeric(err)) => {
                    aborted = Some(err);
                    break;
                }
            }
        }

        for err in &rejected {
            self.diagnostics.report(LogLevel::Warning, err);
        }
        if let Some(err) = aborted {
            self.diagnostics.report(LogLevel::Error, &err);
            result.clear();
        }
        self.data
            .insert(HISTOGRAM_PERCENTILES_KEY.to_string(), Value::Array(result));
    }
}

enum PercentileError {
    /// The element is skipped.
    OutOfRange(ConfigError),
    /// Validation of the whole list stops.
    NotNumeric(ConfigError),
}

fn parse_percentile(item: &Value) -> Result<f64, PercentileError> {
    let value = match item {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(value) = value else {
        return Err(PercentileError::NotNumeric(ConfigError::InvalidPercentileValue {
            value: item.to_string(),
            reason: "not a number, skipping the remaining percentiles".to_string(),
        }));
    };

    let out_of_range = || {
        PercentileError::OutOfRange(ConfigError::InvalidPercentileValue {
            value: item.to_string(),
            reason: "must be float in ]0;1[, skipping".to_string(),
        })
    };
    if !(value > 0.0 && value < 1.0) {
        return Err(out_of_range());
    }

    let truncated = truncate_to_hundredths(value);
    if truncated <= 0.0 {
        return Err(out_of_range());
    }
    Ok(truncated)
}

/// Drop every digit past the second decimal of `value`'s shortest
/// representation. No rounding.
pub fn truncate_to_hundredths(value: f64) -> f64 {
    let repr = value.to_string();
    match repr.split_once('.') {
        Some((whole, fraction)) if fraction.len() > 2 => format!("{}.{}", whole, &fraction[..2])
            .parse()
            .unwrap_or(value),
        _ => value,
    }
}

/// Absent-like values leave a setting untouched: null, false, zero and empty
/// strings, lists or mappings.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn validated(key: &str, value: Value) -> Config {
        let mut config = Config::default();
        config.set(key, value);
        config.validate();
        config
    }

    #[test]
    fn test_aggregates_filtered_and_trimmed() {
        let config = validated(
            HISTOGRAM_AGGREGATES_KEY,
            json!(["min", " max ", "bogus", "avg"]),
        );
        assert_eq!(
            config.data()[HISTOGRAM_AGGREGATES_KEY],
            json!(["min", "max", "avg"])
        );
    }

    #[test]
    fn test_aggregates_keep_duplicates_and_skip_non_strings() {
        let mut config = validated(HISTOGRAM_AGGREGATES_KEY, json!(["max", 3, "max", null]));
        assert_eq!(config.data()[HISTOGRAM_AGGREGATES_KEY], json!(["max", "max"]));

        let codes: Vec<_> = config
            .take_diagnostics()
            .iter()
            .filter_map(|d| d.code)
            .collect();
        assert_eq!(codes, vec![ErrorCode::InvalidAggregateValue; 2]);
    }

    #[test]
    fn test_aggregates_non_list_removed() {
        let config = validated(HISTOGRAM_AGGREGATES_KEY, json!("max,min"));
        assert!(!config.data().contains_key(HISTOGRAM_AGGREGATES_KEY));
    }

    #[test]
    fn test_aggregates_unset_values_untouched() {
        let config = validated(HISTOGRAM_AGGREGATES_KEY, json!([]));
        assert_eq!(config.data()[HISTOGRAM_AGGREGATES_KEY], json!([]));
        let config = validated(HISTOGRAM_AGGREGATES_KEY, Value::Null);
        assert_eq!(config.data()[HISTOGRAM_AGGREGATES_KEY], Value::Null);
    }

    #[test]
    fn test_defaults_are_not_validated() {
        let mut config = Config::default();
        config.set_default(HISTOGRAM_AGGREGATES_KEY, json!(["bogus"]));
        config.validate();
        assert_eq!(config.get(HISTOGRAM_AGGREGATES_KEY).unwrap(), json!(["bogus"]));
        assert!(config.data().is_empty());
    }

    #[test]
    fn test_percentiles_range_and_truncation() {
        let config = validated(HISTOGRAM_PERCENTILES_KEY, json!(["0.95", "1.5", "0.999"]));
        assert_eq!(config.data()[HISTOGRAM_PERCENTILES_KEY], json!([0.95, 0.99]));
    }

    #[test]
    fn test_percentiles_accept_numbers_and_padded_strings() {
        let config = validated(HISTOGRAM_PERCENTILES_KEY, json!([0.5, " 0.75 ", 0.123]));
        assert_eq!(config.data()[HISTOGRAM_PERCENTILES_KEY], json!([0.5, 0.75, 0.12]));
    }

    #[test]
    fn test_percentiles_reject_bounds() {
        let config = validated(HISTOGRAM_PERCENTILES_KEY, json!([0, "1", -0.5, "0.25"]));
        assert_eq!(config.data()[HISTOGRAM_PERCENTILES_KEY], json!([0.25]));
    }

    #[test]
    fn test_percentiles_non_numeric_before_valid_empties_list() {
        let config = validated(HISTOGRAM_PERCENTILES_KEY, json!(["abc", "0.95"]));
        assert_eq!(config.data()[HISTOGRAM_PERCENTILES_KEY], json!([]));
    }

    #[test]
    fn test_percentiles_non_numeric_after_valid_empties_list() {
        let mut config = validated(HISTOGRAM_PERCENTILES_KEY, json!(["0.95", "abc", "0.5"]));
        assert_eq!(config.data()[HISTOGRAM_PERCENTILES_KEY], json!([]));

        let records = config.take_diagnostics();
        assert!(records
            .iter()
            .any(|d| d.code == Some(ErrorCode::InvalidPercentileValue)));
    }

    #[test]
    fn test_percentiles_booleans_dropped_individually() {
        let mut config = validated(HISTOGRAM_PERCENTILES_KEY, json!([true, "0.95", false]));
        assert_eq!(config.data()[HISTOGRAM_PERCENTILES_KEY], json!([0.95]));

        let records = config.take_diagnostics();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|d| d.level == LogLevel::Warning));
    }

    #[test]
    fn test_percentiles_non_list_removed() {
        let config = validated(HISTOGRAM_PERCENTILES_KEY, json!({"p": 0.5}));
        assert!(!config.data().contains_key(HISTOGRAM_PERCENTILES_KEY));
    }

    #[test]
    fn test_truncate_to_hundredths() {
        assert_eq!(truncate_to_hundredths(0.999), 0.99);
        assert_eq!(truncate_to_hundredths(0.95), 0.95);
        assert_eq!(truncate_to_hundredths(0.5), 0.5);
        assert_eq!(truncate_to_hundredths(0.291), 0.29);
        assert_eq!(truncate_to_hundredths(0.001), 0.0);
    }

    #[test]
    fn test_tiny_percentile_rejected_after_truncation() {
        let config = validated(HISTOGRAM_PERCENTILES_KEY, json!([0.001, 0.5]));
        assert_eq!(config.data()[HISTOGRAM_PERCENTILES_KEY], json!([0.5]));
    }
}
