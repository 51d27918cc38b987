//! # Progression Configuration
//!
//! Curve constants and the reward table, fixed for the lifetime of an
//! engine. Changing them for an existing deployment moves every user's
//! level boundaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ProgressionConfig::load("config/progression.json")?;
//! let engine = ProgressionEngine::new(store, config)?;
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reward::RewardTable;

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "XP_CONFIG_PATH";

/// Highest `max_level` a config may request
pub const LEVEL_CAP_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// XP needed to go from level 1 to level 2 (default: 100)
    #[serde(default = "default_base_xp")]
    pub base_xp: u64,

    /// Per-level growth factor of the level cost (default: 1.15)
    #[serde(default = "default_xp_multiplier")]
    pub xp_multiplier: f64,

    /// Hard level cap (default: 50)
    #[serde(default = "default_max_level")]
    pub max_level: u32,

    /// XP granted per action
    #[serde(default)]
    pub rewards: RewardTable,
}

fn default_base_xp() -> u64 {
    100
}
fn default_xp_multiplier() -> f64 {
    1.15
}
fn default_max_level() -> u32 {
    50
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_xp: default_base_xp(),
            xp_multiplier: default_xp_multiplier(),
            max_level: default_max_level(),
            rewards: RewardTable::default(),
        }
    }
}

impl ProgressionConfig {
    /// Load and validate a config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ProgressionConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_xp == 0 {
            return Err(ConfigError::Validation("base_xp must be at least 1".to_string()));
        }
        if !self.xp_multiplier.is_finite() || self.xp_multiplier <= 1.0 {
            return Err(ConfigError::Validation(format!(
                "xp_multiplier must be a finite number above 1.0, got {}",
                self.xp_multiplier
            )));
        }
        if self.max_level < 2 || self.max_level > LEVEL_CAP_LIMIT {
            return Err(ConfigError::Validation(format!(
                "max_level must be 2-{}, got {}",
                LEVEL_CAP_LIMIT, self.max_level
            )));
        }
        if self.rewards.is_empty() {
            return Err(ConfigError::Validation("rewards must not be empty".to_string()));
        }
        if let Some((action, _)) = self.rewards.iter().find(|(_, xp)| *xp == 0) {
            return Err(ConfigError::Validation(format!(
                "reward for {} must be positive",
                action
            )));
        }
        Ok(())
    }
}

/// Config from the file named by `XP_CONFIG_PATH`, or defaults when unset
pub fn load_from_env() -> Result<ProgressionConfig, ConfigError> {
    let Ok(path) = env::var(CONFIG_PATH_ENV) else {
        return Ok(ProgressionConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(ProgressionConfig::default());
    }

    ProgressionConfig::load(path).map_err(|e| e.with_context(&format!("{CONFIG_PATH_ENV}='{path}'")))
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    fn with_context(self, context: &str) -> Self {
        match self {
            ConfigError::Io(msg) => ConfigError::Io(format!("{context}: {msg}")),
            ConfigError::Parse(msg) => ConfigError::Parse(format!("{context}: {msg}")),
            ConfigError::Validation(msg) => ConfigError::Validation(format!("{context}: {msg}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::XpAction;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProgressionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_xp, 100);
        assert_eq!(config.xp_multiplier, 1.15);
        assert_eq!(config.max_level, 50);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ProgressionConfig::from_json(r#"{"max_level": 30}"#).unwrap();
        assert_eq!(config.max_level, 30);
        assert_eq!(config.base_xp, 100);
        assert_eq!(config.rewards, RewardTable::default());
    }

    #[test]
    fn test_custom_rewards() {
        let config = ProgressionConfig::from_json(
            r#"{"rewards": {"module_complete": 80, "daily_choice": 40}}"#,
        )
        .unwrap();
        assert_eq!(config.rewards.reward_for(XpAction::ModuleComplete).unwrap(), 80);
        assert!(config.rewards.reward_for(XpAction::InviteFriend).is_err());
    }

    #[test]
    fn test_validation_bounds() {
        let cases = [
            r#"{"base_xp": 0}"#,
            r#"{"xp_multiplier": 1.0}"#,
            r#"{"xp_multiplier": 0.5}"#,
            r#"{"max_level": 1}"#,
            r#"{"max_level": 5000}"#,
            r#"{"rewards": {}}"#,
            r#"{"rewards": {"quiz_success": 0}}"#,
        ];
        for json in cases {
            assert!(
                matches!(ProgressionConfig::from_json(json), Err(ConfigError::Validation(_))),
                "{} should fail validation",
                json
            );
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ProgressionConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"base_xp": 200, "xp_multiplier": 1.2}}"#).unwrap();

        let config = ProgressionConfig::load(file.path()).unwrap();
        assert_eq!(config.base_xp, 200);
        assert_eq!(config.xp_multiplier, 1.2);

        let missing = ProgressionConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let config = ProgressionConfig { max_level: 20, ..Default::default() };
        let parsed = ProgressionConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
