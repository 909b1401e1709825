// Configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppConfig;

/// Environment variable that overrides the backend base URL.
pub const BACKEND_URL_ENV: &str = "YARNLINK_BACKEND_URL";

pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("yarnlink"))
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Log file location. Falls back to the working directory when the config
/// directory cannot be created.
pub fn get_log_path() -> PathBuf {
    get_config_dir()
        .and_then(|dir| {
            fs::create_dir_all(&dir).context("Failed to create config directory")?;
            Ok(dir)
        })
        .unwrap_or_default()
        .join("yarnlink.log")
}

/// Loads the config file (if any) and applies environment overrides.
pub fn load_config() -> Result<AppConfig> {
    let config = load_config_from(&get_config_path()?)?;
    Ok(apply_env_overrides(config, std::env::var(BACKEND_URL_ENV).ok()))
}

/// Reads `path`, or returns the defaults when it does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(path).context("Failed to read config file")?;

    let config: AppConfig = toml::from_str(&contents).context("Failed to parse config file")?;

    Ok(config)
}

pub fn apply_env_overrides(mut config: AppConfig, backend_url: Option<String>) -> AppConfig {
    if let Some(url) = backend_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
        config.backend_url = url;
    }
    config
}
