//! Resolver configuration loaded from `~/.config/anilink/config.toml`.
//!
//! Every key is optional:
//!
//! ```toml
//! api_host = "allanime.day"
//! referer = "https://allmanga.to"
//! user_agent = "Mozilla/5.0 ..."
//! timeout_secs = 15
//! connect_timeout_secs = 10
//! max_workers = 4
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ResolveError;

pub const DEFAULT_API_HOST: &str = "allanime.day";
pub const DEFAULT_REFERER: &str = "https://allmanga.to";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0";

/// Network settings shared by the metadata client and provider fetches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Host serving both the metadata API (`api.<host>`) and provider paths.
    pub api_host: String,
    pub referer: String,
    pub user_agent: String,
    /// Per-request timeout, applied to every provider fetch.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Maximum provider fetches in flight at once.
    pub max_workers: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 10,
            max_workers: 4,
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Metadata API endpoint, e.g. `https://api.allanime.day/api`.
    pub fn api_endpoint(&self) -> String {
        format!("https://api.{}/api", self.api_host)
    }

    /// Absolute URL for a decoded provider path.
    pub fn provider_url(&self, path: &str) -> String {
        format!("https://{}{path}", self.api_host)
    }

    pub fn validate(&self) -> std::result::Result<(), ResolveError> {
        if self.max_workers == 0 {
            return Err(ResolveError::Config("max_workers must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ResolveError::Config("timeout_secs must be at least 1".into()));
        }
        if self.api_host.trim().is_empty() {
            return Err(ResolveError::Config("api_host must not be empty".into()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("invalid resolver config")?;
        config.validate()?;
        Ok(config)
    }
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file yields [`ResolverConfig::default`].
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed or
/// validated.
pub fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if !path.exists() {
        return Ok(ResolverConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    ResolverConfig::from_toml(&content).with_context(|| format!("in {}", path.display()))
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anilink")
        .join("config.toml")
}
