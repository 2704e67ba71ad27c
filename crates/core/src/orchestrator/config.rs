//! Brush runner configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the periodic brush runner.
///
/// Only read by an embedding that builds a `BrushRunner` with its own client
/// and site adapters. `brushd` serves the HTTP API and does not brush on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Seconds between two brush runs.
    /// Each run visits every configured site once.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_interval() -> u64 {
    600 // 10 minutes
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.interval_secs, 600);
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: RunnerConfig = toml::from_str("").unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            interval_secs = 120
        "#;
        let config: RunnerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.interval_secs, 120);
    }
}
