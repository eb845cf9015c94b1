use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::open_meteo::OPEN_METEO_FORECAST_URL;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// endpoint = "https://api.open-meteo.com/v1/forecast"
/// request_timeout_secs = 10
/// log_filter = "pinpoint_core=debug"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Forecast endpoint override. Absent means the public Open-Meteo API.
    pub endpoint: Option<String>,

    /// Give up on a weather request after this many seconds.
    /// Absent means no timeout beyond the transport's own.
    pub request_timeout_secs: Option<u64>,

    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}

impl Config {
    /// Endpoint the weather client should call.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(OPEN_METEO_FORECAST_URL)
    }

    /// Validate and store an endpoint override.
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        let url = Url::parse(endpoint.trim())
            .with_context(|| format!("Invalid endpoint URL: {endpoint}"))?;

        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "Unsupported endpoint scheme '{}'.\n\
                 Hint: the endpoint must start with http:// or https://",
                url.scheme()
            );
        }

        self.endpoint = Some(url.to_string());
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Zero clears the timeout.
    pub fn set_request_timeout_secs(&mut self, secs: u64) {
        self.request_timeout_secs = (secs > 0).then_some(secs);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

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

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

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
        let dirs = ProjectDirs::from("dev", "pinpoint", "pinpoint")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
