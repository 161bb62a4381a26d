use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::CacheTiers;

/// Client configuration, stored as TOML under the user config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub currency: String,
    pub default_country: String,
    pub theme_color: String,
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.aurelane.example/api".to_string(),
            currency: "INR".to_string(),
            default_country: crate::checkout::DEFAULT_COUNTRY.to_string(),
            theme_color: crate::checkout::THEME_COLOR.to_string(),
            cache: CacheConfig::default(),
        }
    }
}

/// Cache freshness tuning. The exact numbers are a knob; the ordering
/// taxonomy >= detail >= list is a requirement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub list_ttl_secs: u64,
    pub detail_ttl_secs: u64,
    pub taxonomy_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl_secs: 120,
            detail_ttl_secs: 600,
            taxonomy_ttl_secs: 1800,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.taxonomy_ttl_secs < self.detail_ttl_secs
            || self.detail_ttl_secs < self.list_ttl_secs
        {
            bail!(
                "cache TTLs must be ordered taxonomy >= detail >= list (got {}/{}/{})",
                self.taxonomy_ttl_secs,
                self.detail_ttl_secs,
                self.list_ttl_secs
            );
        }
        Ok(())
    }

    pub fn tiers(&self) -> CacheTiers {
        CacheTiers {
            list: Duration::from_secs(self.list_ttl_secs),
            detail: Duration::from_secs(self.detail_ttl_secs),
            taxonomy: Duration::from_secs(self.taxonomy_ttl_secs),
        }
    }
}

impl Config {
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("aurelane");
        std::fs::create_dir_all(&dir).context("Failed to create config directory")?;
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::ensure_config_dir()?.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it does not
    /// exist yet. A present-but-invalid file is an error.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.cache.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(Self::config_path()?, content).context("Failed to write config file")?;
        Ok(())
    }
}
