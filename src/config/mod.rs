//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Analytics tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Number of opening picks that make up a lead (2 in doubles)
    #[serde(default = "default_lead_size")]
    pub lead_size: usize,

    /// Encounters needed before an opponent is ranked best/worst
    #[serde(default = "default_min_matchup_games")]
    pub min_matchup_games: u32,

    #[serde(default = "default_lead_view_limit")]
    pub lead_view_limit: usize,

    #[serde(default = "default_matchup_view_limit")]
    pub matchup_view_limit: usize,

    /// Slots in a custom matchup
    #[serde(default = "default_custom_slots")]
    pub custom_slots: usize,
}

fn default_lead_size() -> usize {
    2
}

fn default_min_matchup_games() -> u32 {
    3
}

fn default_lead_view_limit() -> usize {
    6
}

fn default_matchup_view_limit() -> usize {
    5
}

fn default_custom_slots() -> usize {
    6
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            lead_size: default_lead_size(),
            min_matchup_games: default_min_matchup_games(),
            lead_view_limit: default_lead_view_limit(),
            matchup_view_limit: default_matchup_view_limit(),
            custom_slots: default_custom_slots(),
        }
    }
}

impl AnalyticsConfig {
    /// Validate the analytics settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lead_size == 0 {
            return Err(ConfigError::ValidationError(
                "lead_size must be greater than 0".to_string(),
            ));
        }

        if self.custom_slots == 0 {
            return Err(ConfigError::ValidationError(
                "custom_slots must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Form table overriding the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forms_file: Option<PathBuf>,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            forms_file: None,
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "data_dir must not be empty".to_string(),
            ));
        }

        self.analytics.validate()
    }
}
