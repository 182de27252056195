// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application configuration.
//!
//! Settings are read from a TOML file. Every field has a default, so a
//! partial file works and a missing file means "all defaults".

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "vidseq.toml";

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Where the session is stored
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Delay between starting a row and seeking it to its clip start
    #[serde(default = "default_seek_delay_ms")]
    pub seek_delay_ms: u64,
    /// Quiet period before a time edit is committed
    #[serde(default = "default_edit_debounce_ms")]
    pub edit_debounce_ms: u64,
    /// How often playing rows are checked against their end offset
    #[serde(default = "default_clip_watch_interval_ms")]
    pub clip_watch_interval_ms: u64,
    /// Environment variable holding the YouTube Data API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("vidseq-session.json")
}
fn default_seek_delay_ms() -> u64 {
    100
}
fn default_edit_debounce_ms() -> u64 {
    300
}
fn default_clip_watch_interval_ms() -> u64 {
    100
}
fn default_api_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            seek_delay_ms: default_seek_delay_ms(),
            edit_debounce_ms: default_edit_debounce_ms(),
            clip_watch_interval_ms: default_clip_watch_interval_ms(),
            api_key_env: default_api_key_env(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(?path, "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    pub fn seek_delay(&self) -> Duration {
        Duration::from_millis(self.seek_delay_ms)
    }

    pub fn edit_debounce(&self) -> Duration {
        Duration::from_millis(self.edit_debounce_ms)
    }

    /// Clip watch period, at least 1ms
    pub fn clip_watch_interval(&self) -> Duration {
        Duration::from_millis(self.clip_watch_interval_ms.max(1))
    }

    /// The API key from the configured environment variable, if set
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
