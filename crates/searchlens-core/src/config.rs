//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the token storage backend, the
//! application name sent on registration and the last used email.
//!
//! Configuration is stored at `~/.config/searchlens/config.json`. Environment
//! variables override the file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "searchlens";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

pub const ENV_API_URL: &str = "SEARCHLENS_API_URL";
pub const ENV_APP_NAME: &str = "SEARCHLENS_APP_NAME";
pub const ENV_TOKEN_STORAGE: &str = "SEARCHLENS_TOKEN_STORAGE";

/// Where the bearer token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keyring,
}

impl FromStr for TokenStorage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(TokenStorage::File),
            "keyring" | "keychain" => Ok(TokenStorage::Keyring),
            other => Err(anyhow::anyhow!("Unknown token storage: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub app_name: Option<String>,
    pub token_storage: TokenStorage,
    pub request_timeout_secs: Option<u64>,
    pub last_email: Option<String>,
}

impl Config {
    /// Load the config file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Persist the last used email without writing environment overrides to disk
    pub fn remember_email(email: &str) -> Result<()> {
        let path = Self::config_path()?;
        let mut on_disk = Self::load_from(&path)?;
        on_disk.last_email = Some(email.to_string());
        on_disk.save_to(&path)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(name) = non_empty(ENV_APP_NAME) {
            self.app_name = Some(name);
        }
        if let Some(storage) = non_empty(ENV_TOKEN_STORAGE) {
            match storage.parse() {
                Ok(storage) => self.token_storage = storage,
                Err(e) => tracing::warn!(error = %e, "Ignoring {}", ENV_TOKEN_STORAGE),
            }
        }
    }

    pub fn base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Scheme, host and port of the API, e.g. `http://localhost:8080`
    pub fn origin(&self) -> Result<String> {
        let url = Url::parse(self.base_url())
            .with_context(|| format!("Invalid API base URL: {}", self.base_url()))?;
        if !url.has_host() {
            return Err(anyhow::anyhow!("API base URL has no host: {}", url));
        }
        Ok(url.origin().ascii_serialization())
    }

    /// Per-origin data directory holding the token file, analysis input and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join(Self::origin_dir_name(&self.origin()?)))
    }

    fn origin_dir_name(origin: &str) -> String {
        let mut name = String::with_capacity(origin.len());
        for c in origin.chars() {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                name.push(c);
            } else if !name.ends_with('_') {
                name.push('_');
            }
        }
        name
    }
}
