use crate::error::{Result, VoronoiError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Limits and tunables for the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Largest accepted site set.
    #[serde(default = "default_max_sites")]
    pub max_sites: usize,

    /// Live sessions allowed at once.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time after which a session is reclaimed.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Completion box padding as a fraction of the larger extent.
    #[serde(default = "default_padding_factor")]
    pub padding_factor: f64,
}

fn default_max_sites() -> usize {
    100
}

fn default_max_sessions() -> usize {
    256
}

fn default_session_ttl_secs() -> u64 {
    30 * 60
}

fn default_padding_factor() -> f64 {
    0.25
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_sites: default_max_sites(),
            max_sessions: default_max_sessions(),
            session_ttl_secs: default_session_ttl_secs(),
            padding_factor: default_padding_factor(),
        }
    }
}

impl CoreConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| VoronoiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| VoronoiError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_sites == 0 {
            return Err(VoronoiError::Config("max_sites must be positive".into()));
        }
        if self.max_sessions == 0 {
            return Err(VoronoiError::Config("max_sessions must be positive".into()));
        }
        if !self.padding_factor.is_finite() || self.padding_factor < 0.0 {
            return Err(VoronoiError::Config(format!(
                "padding_factor must be a non-negative number, got {}",
                self.padding_factor
            )));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
