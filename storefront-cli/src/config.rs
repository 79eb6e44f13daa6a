//! Configuration management for the storefront CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefront::{FileStorage, StorefrontClient};

use crate::output::ConsoleNotifier;

/// CLI configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service connection settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Service connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `http://localhost:8000/api/`.
    pub base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
}

fn exe_dir() -> Result<PathBuf> {
    let exe_path = env::current_exe().context("Could not determine executable path")?;
    let exe_dir = exe_path
        .parent()
        .context("Could not determine executable directory")?;

    Ok(exe_dir.to_path_buf())
}

/// Get the configuration file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(exe_dir()?.join("storefront.toml"))
}

/// Get the persisted session path.
pub fn session_path() -> Result<PathBuf> {
    Ok(exe_dir()?.join("storefront-session.json"))
}

/// Load configuration from file.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path).context("Failed to read config file")?;

    toml::from_str(&content).context("Failed to parse config file")
}

/// Save configuration to file.
pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path()?;
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&path, content).context("Failed to write config file")?;

    Ok(())
}

/// Build a client with the on-disk session. `base_url` overrides the config file.
pub fn build_client(base_url: Option<&str>) -> Result<StorefrontClient> {
    let config = load_config()?;

    let mut builder = StorefrontClient::builder()
        .storage(Arc::new(FileStorage::new(session_path()?)))
        .notifier(Arc::new(ConsoleNotifier));

    if let Some(url) = base_url.map(str::to_owned).or(config.api.base_url) {
        builder = builder.base_url(url);
    }
    if let Some(secs) = config.api.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.api.read_timeout_secs {
        builder = builder.read_timeout(Duration::from_secs(secs));
    }

    builder.build().context("Failed to build storefront client")
}
