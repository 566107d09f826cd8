//! Client configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bondify_core::CachePolicy;

/// Where and how to reach the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Review session defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Due words fetched per session.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Days shown by `bondify forecast`.
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            forecast_days: default_forecast_days(),
        }
    }
}

/// Top-level bondify configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BondifyConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    /// Freshness windows for cached queries.
    #[serde(default)]
    pub cache: CachePolicy,
    /// Where login stores tokens. Defaults to the config directory.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_batch_size() -> u32 {
    20
}
fn default_forecast_days() -> u32 {
    7
}

impl BondifyConfig {
    /// Path of the stored credentials file.
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path.clone().unwrap_or_else(|| {
            config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("credentials.json")
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `bondify.toml` in the current directory
/// 2. `~/.config/bondify/config.toml`
///
/// Environment variable override: `BONDIFY_API_URL`.
pub fn load_config() -> Result<BondifyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BondifyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("bondify.toml");
        if local.exists() {
            Some(local)
        } else {
            config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config(
            &std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?,
        )
        .with_context(|| format!("failed to parse config: {}", path.display()))?,
        None => BondifyConfig::default(),
    };

    if let Ok(url) = std::env::var("BONDIFY_API_URL") {
        config.api.base_url = url;
    }
    config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();

    anyhow::ensure!(
        config.review.batch_size >= 1,
        "review.batch_size must be at least 1"
    );
    Ok(config)
}

fn parse_config(content: &str) -> Result<BondifyConfig> {
    let mut config: BondifyConfig = toml::from_str(content)?;
    config.api.base_url = resolve_env_vars(&config.api.base_url);
    config.credentials_path = config
        .credentials_path
        .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy())));
    Ok(config)
}

/// `~/.config/bondify`, if `HOME` is set.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("bondify"))
}
