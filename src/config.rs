use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Host settings for the `watch` loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Telescope definitions, `name:type[:params]`.
    #[serde(default)]
    pub telescopes: Vec<String>,
    /// Longest single wait for readiness.
    #[serde(default = "default_tick", deserialize_with = "human_duration")]
    pub tick: Duration,
    #[serde(default = "default_report_interval", deserialize_with = "human_duration")]
    pub report_interval: Duration,
}

fn default_tick() -> Duration {
    Duration::from_millis(100)
}

fn default_report_interval() -> Duration {
    Duration::from_secs(1)
}

fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telescopes: Vec::new(),
            tick: default_tick(),
            report_interval: default_report_interval(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let config = Config::from_str(
            r#"
telescopes:
  - "Scope1:TCP:localhost:10000:500000"
  - "Sim:Dummy"
tick: 50ms
report_interval: 2s
"#,
        )
        .unwrap();
        assert_eq!(config.telescopes.len(), 2);
        assert_eq!(config.tick, Duration::from_millis(50));
        assert_eq!(config.report_interval, Duration::from_secs(2));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_str("telescopes: []").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_duration_is_a_parse_error() {
        assert!(matches!(
            Config::from_str("tick: soon"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Config::from_file("/nonexistent/scope-link.yaml"),
            Err(ConfigError::Io(_))
        ));
    }
}
