use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::aggregator::DEFAULT_CONCURRENCY;
use crate::models::Ecosystem;
use crate::source::azure::DEFAULT_API_VERSION;

/// Root configuration structure, deserialized from `.repo-insights/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    /// Defaults for remote scans; CLI flags take precedence.
    #[serde(default)]
    pub azure: AzureConfig,
}

#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    /// Manifests fetched in parallel within one ecosystem.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Ecosystems never scanned (e.g. `["go"]`).
    #[serde(default)]
    pub exclude: Vec<Ecosystem>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            exclude: Vec::new(),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

#[derive(Debug, Deserialize)]
pub struct AzureConfig {
    /// Organization URL, e.g. `https://dev.azure.com/contoso`.
    pub organization: Option<String>,
    pub project: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            organization: None,
            project: None,
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.repo-insights/config.toml`
/// 3. `~/.config/repo-insights/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".repo-insights").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("repo-insights")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
