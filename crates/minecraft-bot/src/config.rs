//! Configuration management for minecraft-bot

#[path = "config_tests.rs"]
mod config_tests;

use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Complete bot configuration.
///
/// Per-guild server endpoints are deliberately NOT here: they are set at
/// runtime by guild operators and live in the whitelist store alongside
/// the roster they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub rcon: RconSettings,
}

/// Discord bot specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal
    #[serde(default = "default_bot_token")]
    pub bot_token: String,
}

/// Whitelist state storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON document per guild
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// RCON client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RconSettings {
    /// Per-command deadline in seconds; expiry counts as unreachable.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RconSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Read environment variables; swapped for an in-memory map in tests.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Process environment
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env(env: &impl ReadEnv) -> Result<Self> {
        let bot_token = env
            .var("DISCORD_BOT_TOKEN")
            .context("DISCORD_BOT_TOKEN not set")?;

        let data_dir = env
            .var("WHITELIST_DATA_DIR")
            .unwrap_or_else(default_data_dir);

        let timeout_secs = env
            .var("RCON_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_timeout_secs);

        Ok(Config {
            discord: DiscordConfig { bot_token },
            storage: StorageConfig { data_dir },
            rcon: RconSettings { timeout_secs },
        })
    }
}

fn default_bot_token() -> String {
    std::env::var("DISCORD_BOT_TOKEN").unwrap_or_default()
}

fn default_data_dir() -> String {
    "data/whitelist".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
