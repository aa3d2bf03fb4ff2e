//! Configuration system for practica.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PracticaError, PracticaResult};
use crate::traits::{ItemBankConfig, ItemBankProvider};
use crate::types::MasteryThresholds;

/// Mastery update rule settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryConfig {
    /// Score change for a correct attempt.
    pub correct_delta: f64,
    /// Score change for an incorrect attempt.
    pub incorrect_delta: f64,
    /// Days between an attempt and the next scheduled review.
    pub review_interval_days: i64,
    /// Level banding thresholds.
    pub thresholds: MasteryThresholds,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            correct_delta: 0.03,
            incorrect_delta: -0.01,
            review_interval_days: 7,
            thresholds: MasteryThresholds::default(),
        }
    }
}

/// Practice session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Delay before loading the next item after a correct answer.
    pub auto_advance_delay_ms: u64,
    /// Maximum number of hints exposed per item.
    pub max_hints: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_advance_delay_ms: 1000,
            max_hints: 3,
        }
    }
}

impl SessionConfig {
    /// Auto-advance delay as a duration.
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }
}

/// Review scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Look-ahead window of the "this week" bucket, in days.
    pub look_ahead_days: i64,
    /// Item count used when a custom review does not name one.
    pub default_item_count: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            look_ahead_days: 7,
            default_item_count: 10,
        }
    }
}

/// Main practica configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticaConfig {
    /// Mastery rule configuration.
    pub mastery: MasteryConfig,
    /// Session configuration.
    pub session: SessionConfig,
    /// Review scheduler configuration.
    pub review: ReviewConfig,
    /// Item bank configuration.
    pub item_bank: ItemBankConfig,
    /// Path to the mastery database.
    pub db_path: PathBuf,
}

impl Default for PracticaConfig {
    fn default() -> Self {
        let practica_dir = dirs::home_dir()
            .map(|h| h.join(".practica"))
            .unwrap_or_else(|| PathBuf::from(".practica"));

        Self {
            mastery: MasteryConfig::default(),
            session: SessionConfig::default(),
            review: ReviewConfig::default(),
            item_bank: ItemBankConfig::default(),
            db_path: practica_dir.join("mastery.db"),
        }
    }
}

impl PracticaConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> PracticaResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| PracticaError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| PracticaError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| PracticaError::Configuration(e.to_string())),
            _ => Err(PracticaError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - `PRACTICA_DB_PATH`
    /// - `PRACTICA_ITEM_BANK_PROVIDER` (`remote` or `offline`)
    /// - `PRACTICA_ITEM_BANK_URL`
    /// - `PRACTICA_ITEM_BANK_API_KEY`
    /// - `PRACTICA_ITEM_BANK_TIMEOUT_SECS`
    /// - `PRACTICA_AUTO_ADVANCE_MS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("PRACTICA_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Ok(provider) = std::env::var("PRACTICA_ITEM_BANK_PROVIDER") {
            config.item_bank.provider = match provider.to_lowercase().as_str() {
                "offline" => ItemBankProvider::Offline,
                _ => ItemBankProvider::Remote,
            };
        }
        if let Ok(url) = std::env::var("PRACTICA_ITEM_BANK_URL") {
            config.item_bank.base_url = url;
        }
        if let Ok(api_key) = std::env::var("PRACTICA_ITEM_BANK_API_KEY") {
            config.item_bank.api_key = Some(api_key);
        }
        if let Ok(timeout) = std::env::var("PRACTICA_ITEM_BANK_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.item_bank.timeout_secs = secs;
            }
        }

        if let Ok(delay) = std::env::var("PRACTICA_AUTO_ADVANCE_MS") {
            if let Ok(ms) = delay.parse() {
                config.session.auto_advance_delay_ms = ms;
            }
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> PracticaConfigBuilder {
        PracticaConfigBuilder::default()
    }
}

/// Builder for PracticaConfig.
#[derive(Default)]
pub struct PracticaConfigBuilder {
    config: PracticaConfig,
}

impl PracticaConfigBuilder {
    /// Set mastery configuration.
    pub fn mastery(mut self, config: MasteryConfig) -> Self {
        self.config.mastery = config;
        self
    }

    /// Set session configuration.
    pub fn session(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Set review configuration.
    pub fn review(mut self, config: ReviewConfig) -> Self {
        self.config.review = config;
        self
    }

    /// Set item bank configuration.
    pub fn item_bank(mut self, config: ItemBankConfig) -> Self {
        self.config.item_bank = config;
        self
    }

    /// Set the mastery database path.
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PracticaConfig {
        self.config
    }
}
