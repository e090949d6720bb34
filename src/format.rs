//! Output formatting for resolved configuration.

use anyhow::Result;
use serde::Serialize;

/// Output format for printed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Render any serializable value in this format.
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(match self {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => {
                let mut out = serde_json::to_string_pretty(value)?;
                out.push('\n');
                out
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render() {
        let value = json!({"site": "datadoghq.com"});
        assert_eq!(OutputFormat::Yaml.render(&value).unwrap(), "site: datadoghq.com\n");
        assert_eq!(
            OutputFormat::Json.render(&value).unwrap(),
            "{\n  \"site\": \"datadoghq.com\"\n}\n"
        );
    }
}
