//! # Configuration Management Module
//!
//! Centralised, TOML-backed configuration for the treasure hunt engine and CLI.
//!
//! ## Configuration Structure
//!
//! - [`HuntConfig`] - Event settings (name, venue, registration codes, quiz cooldown)
//! - [`CameraConfig`] - Requested facing mode and stream constraints
//! - [`ScannerConfig`] - QR polling cadence
//! - [`NotificationConfig`] - Toast lifetime
//! - [`SeedConfig`] - Optional custom location list
//! - [`LoggingConfig`] - Logging settings
//!
//! ## Usage
//!
//! ```rust,no_run
//! use treasurehunt::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Event: {}", config.hunt.name);
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [hunt]
//! name = "Independence Day Treasure Hunt"
//! venue = "Supermal Karawaci"
//! valid_codes = ["TREAS1", "TREAS2"]
//! quiz_cooldown_minutes = 180
//!
//! [scanner]
//! retry_interval_ms = 100
//! mismatch_pause_ms = 2000
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

use crate::hunt::camera::{FacingMode, StreamConstraints};
use crate::hunt::progress::DEFAULT_QUIZ_COOLDOWN_MINUTES;
use crate::hunt::scanner::ScanTiming;
use crate::hunt::toast::DEFAULT_TOAST_DURATION_MS;
use crate::validation::default_registration_codes;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hunt: HuntConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuntConfig {
    pub name: String,
    pub venue: String,
    /// Registration codes handed out to participants
    #[serde(default = "default_registration_codes")]
    pub valid_codes: Vec<String>,
    /// Lockout after a wrong quiz answer
    #[serde(default = "default_quiz_cooldown_minutes")]
    pub quiz_cooldown_minutes: i64,
}

fn default_quiz_cooldown_minutes() -> i64 {
    DEFAULT_QUIZ_COOLDOWN_MINUTES
}

impl HuntConfig {
    pub fn quiz_cooldown(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.quiz_cooldown_minutes.max(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CameraConfig {
    #[serde(default)]
    pub facing: FacingMode,
    #[serde(default)]
    pub constraints: StreamConstraints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub retry_interval_ms: u64,
    pub mismatch_pause_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: 100,
            mismatch_pause_ms: 2000,
        }
    }
}

impl ScannerConfig {
    pub fn timing(&self) -> ScanTiming {
        ScanTiming {
            // A zero interval would spin the decoder
            retry_interval: Duration::from_millis(self.retry_interval_ms.max(10)),
            mismatch_pause: Duration::from_millis(self.mismatch_pause_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub toast_duration_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
        }
    }
}

impl NotificationConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    /// JSON file with a custom location list; built-in venue when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing or
    /// invalid. The load error is handed back so it can be reported once
    /// logging is configured.
    pub async fn load_or_default(path: &str) -> (Self, Option<anyhow::Error>) {
        match Config::load(path).await {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hunt: HuntConfig {
                name: "Independence Day Treasure Hunt".to_string(),
                venue: "Supermal Karawaci".to_string(),
                valid_codes: default_registration_codes(),
                quiz_cooldown_minutes: DEFAULT_QUIZ_COOLDOWN_MINUTES,
            },
            camera: CameraConfig::default(),
            scanner: ScannerConfig::default(),
            notifications: NotificationConfig::default(),
            seed: SeedConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }
}
