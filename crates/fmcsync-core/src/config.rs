//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds
//! the management host, username, TLS policy, domain UUID and snapshot
//! directory. The password normally lives in the OS keychain.
//!
//! Configuration is stored at `~/.config/fmcsync/config.json`. Environment
//! variables override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{CredentialStore, Credentials};

/// Application name used for config directory paths
const APP_NAME: &str = "fmcsync";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Snapshot directory used when none is configured
const DEFAULT_DATA_DIR: &str = "data";

pub const ENV_HOST: &str = "FMC_HOST";
pub const ENV_USERNAME: &str = "FMC_USERNAME";
pub const ENV_PASSWORD: &str = "FMC_PASSWORD";
pub const ENV_VERIFY_SSL: &str = "FMC_VERIFY_SSL";
pub const ENV_DOMAIN_UUID: &str = "FMC_DOMAIN_UUID";
pub const ENV_DATA_DIR: &str = "FMCSYNC_DATA_DIR";

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub host: Option<String>,
    pub username: Option<String>,
    /// Plain-text password; prefer the keychain. Never written by `init`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub verify_ssl: bool,
    pub domain_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
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
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Override fields from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(ENV_HOST) {
            self.host = Some(host);
        }
        if let Some(username) = get(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(password) = get(ENV_PASSWORD) {
            self.password = Some(password);
        }
        if let Some(verify) = get(ENV_VERIFY_SSL) {
            self.verify_ssl = parse_bool(&verify);
        }
        if let Some(domain) = get(ENV_DOMAIN_UUID) {
            self.domain_uuid = Some(domain);
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Session credentials. The password comes from the config or
    /// environment first, then the OS keychain. Missing values are left
    /// empty so the session reports `AuthenticationFailed`.
    pub fn credentials(&self) -> Credentials {
        let username = self.username.clone().unwrap_or_default();
        let password = self
            .password
            .clone()
            .or_else(|| {
                if username.is_empty() {
                    None
                } else {
                    CredentialStore::get_password(&username).ok()
                }
            })
            .unwrap_or_default();

        Credentials::new(
            self.host.clone().unwrap_or_default(),
            username,
            password,
            self.verify_ssl,
        )
    }

    pub fn domain_uuid(&self) -> Result<&str> {
        self.domain_uuid
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Domain UUID not configured. Run `fmcsync init` first."))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
