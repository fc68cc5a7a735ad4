//! # Configuration Management Module
//!
//! TOML configuration for the bridge binary. Every section falls back to its
//! defaults, so a partial file (or just `[server]`) is enough to start.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - coordination server endpoint and slot credentials
//! - [`LinkConfig`] - connect retry and socket tuning for the remote link
//! - [`SessionConfig`] - resync scheduling, DeathLink, notice log size
//! - [`TrapConfig`] - durations of timed traps and buffs
//! - [`StorageConfig`] - where the progression database lives
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use goosebridge::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Slot: {} @ {}:{}", config.server.slot, config.server.address, config.server.port);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [server]
//! address = "archipelago.gg"
//! port = 38281
//! slot = "Goose"
//!
//! [session]
//! death_link = true
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

use crate::effects::EffectDurations;
use crate::link::LinkTuning;
use crate::session::SessionSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub slot: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 38281,
            slot: "Goose".to_string(),
            password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub connect_attempts: u32,
    pub connect_retry_ms: u64,
    /// Socket read timeout; bounds how long a disconnect waits for the reader thread.
    pub read_timeout_ms: u64,
    pub max_line_bytes: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_attempts: 5,
            connect_retry_ms: 500,
            read_timeout_ms: 250,
            max_line_bytes: 1024 * 1024,
        }
    }
}

impl LinkConfig {
    pub fn tuning(&self) -> LinkTuning {
        LinkTuning {
            connect_attempts: self.connect_attempts.max(1),
            retry_delay: Duration::from_millis(self.connect_retry_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms.max(10)),
            max_line_bytes: self.max_line_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Delay between the handshake completing and the first resync pass
    pub resync_delay_ms: u64,
    pub resync_attempts: u32,
    pub resync_interval_ms: u64,
    pub death_link: bool,
    pub message_log_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resync_delay_ms: 2000,
            resync_attempts: 5,
            resync_interval_ms: 2000,
            death_link: false,
            message_log_size: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapConfig {
    pub tired_secs: u64,
    pub confused_secs: u64,
    pub butterbeak_secs: u64,
    pub suspicious_secs: u64,
    pub goose_day_secs: u64,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            tired_secs: 60,
            confused_secs: 60,
            butterbeak_secs: 60,
            suspicious_secs: 30,
            goose_day_secs: 60,
        }
    }
}

impl TrapConfig {
    pub fn durations(&self) -> EffectDurations {
        EffectDurations {
            tired: Duration::from_secs(self.tired_secs),
            confused: Duration::from_secs(self.confused_secs),
            butterbeak: Duration::from_secs(self.butterbeak_secs),
            suspicious: Duration::from_secs(self.suspicious_secs),
            goose_day: Duration::from_secs(self.goose_day_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("goosebridge.log".to_string()),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub traps: TrapConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Write a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Session coordinator settings derived from the `[session]` and `[traps]` sections.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            resync_delay: Duration::from_millis(self.session.resync_delay_ms),
            resync_attempts: self.session.resync_attempts.max(1),
            resync_interval: Duration::from_millis(self.session.resync_interval_ms),
            death_link: self.session.death_link,
            message_log_size: self.session.message_log_size.max(1),
            effects: self.traps.durations(),
        }
    }
}
