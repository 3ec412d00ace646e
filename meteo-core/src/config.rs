use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    model::Coordinates,
    service::{DEFAULT_FORECAST_DAYS, DEFAULT_GEOCODING_BASE, DEFAULT_SEARCH_COUNT},
};

/// Environment variable that overrides [`Config::api_base`].
pub const API_BASE_ENV: &str = "API_BASE";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_base = "https://api.open-meteo.com/v1"
/// forecast_days = 7
///
/// [default_location]
/// latitude = 52.52
/// longitude = 13.41
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Forecast API base URL. Left unset, forecast requests fail at the HTTP layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoding_base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_days: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_count: Option<u32>,

    /// Where new weather views start out; `meteo show` with no city uses it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<Coordinates>,
}

impl Config {
    /// Load config from disk and apply the `API_BASE` override.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_api_base_override(std::env::var(API_BASE_ENV).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo", "meteo-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace `api_base` with a non-empty override value.
    pub fn apply_api_base_override(&mut self, value: Option<String>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.api_base = Some(value);
        }
    }

    /// Forecast base URL, empty when unconfigured.
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or_default()
    }

    pub fn has_api_base(&self) -> bool {
        !self.api_base().trim().is_empty()
    }

    pub fn geocoding_base(&self) -> &str {
        self.geocoding_base.as_deref().unwrap_or(DEFAULT_GEOCODING_BASE)
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS)
    }

    pub fn search_count(&self) -> u32 {
        self.search_count.unwrap_or(DEFAULT_SEARCH_COUNT)
    }
}
