//! Session configuration, loadable from JSON.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::utils::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessConfig {
    /// Upper bound on evaluation passes in flight at once. A session
    /// dispatches at most one pass, so the bound only limits passes started
    /// by `try_run` while another is running; such a request is skipped,
    /// not queued.
    #[serde(default = "WitnessConfig::default_max_concurrent_evaluations")]
    pub max_concurrent_evaluations: usize,
    /// Bound on `join`; `None` waits indefinitely.
    #[serde(default)]
    pub join_timeout_ms: Option<u64>,
}

impl WitnessConfig {
    fn default_max_concurrent_evaluations() -> usize {
        1
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_evaluations == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent_evaluations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn join_timeout(&self) -> Option<Duration> {
        self.join_timeout_ms.map(Duration::from_millis)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let config: WitnessConfig = serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfig(format!("witness config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_json(&s)
    }
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            max_concurrent_evaluations: Self::default_max_concurrent_evaluations(),
            join_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WitnessConfig::from_json("{}").unwrap();
        assert_eq!(config, WitnessConfig::default());
        assert_eq!(config.join_timeout(), None);
        let config = WitnessConfig::from_json(r#"{"join_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.join_timeout(), Some(Duration::from_millis(250)));
        assert!(matches!(
            WitnessConfig::from_json(r#"{"max_concurrent_evaluations": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
    }
}
