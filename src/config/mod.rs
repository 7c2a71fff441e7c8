use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::infrastructure::cache::{CacheSettings, DEFAULT_CACHE_CAPACITY};
use crate::core::services::lyrics::DEFAULT_LYRICS_BASE_URL;
use crate::core::services::video::DEFAULT_VIDEO_SEARCH_URL;
use crate::core::strategy::DEFAULT_FUZZY_THRESHOLD;
use crate::error::{ConfigError, MusicFinderError, Result};

pub mod env;
pub mod validation;

use env::{EnvParser, EnvVars};
use validation::ConfigValidator;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Remote lyrics endpoint; artist and song are appended as path segments
    pub lyrics_base_url: String,

    /// Video search results page; the query goes in `search_query`
    pub video_search_url: String,

    /// Timeout for one remote lyrics request
    pub http_timeout_seconds: u64,

    /// Attempts per lyrics lookup when the remote fails transiently
    pub max_attempts: u32,

    /// Entries kept by each cache decorator
    pub cache_capacity: usize,

    /// Age after which cached results are refetched (optional)
    pub cache_ttl_seconds: Option<u64>,

    /// Minimum similarity for the fuzzy strategy to accept a result
    pub fuzzy_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lyrics_base_url: DEFAULT_LYRICS_BASE_URL.to_string(),
            video_search_url: DEFAULT_VIDEO_SEARCH_URL.to_string(),
            http_timeout_seconds: 10,
            max_attempts: 3,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_seconds: None,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Try to load .env file if it exists (for Docker and development)
        dotenvy::dotenv().ok();

        let mut config = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(ConfigError::FileNotFound { path }.into());
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        // Override with environment variables (highest priority)
        config.load_from_env()?;
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    fn load_from_env(&mut self) -> Result<()> {
        if let Some(url) = EnvParser::parse_string(
            EnvVars::LYRICS_BASE_URL,
            Some(validate_lyrics_url),
        )? {
            self.lyrics_base_url = url;
        }

        if let Some(url) = EnvParser::parse_string(
            EnvVars::VIDEO_SEARCH_URL,
            Some(validate_video_url),
        )? {
            self.video_search_url = url;
        }

        if let Some(timeout) = EnvParser::parse_u64(EnvVars::HTTP_TIMEOUT_SECONDS, 1, 300)? {
            self.http_timeout_seconds = timeout;
        }

        if let Some(attempts) = EnvParser::parse_u64(EnvVars::MAX_ATTEMPTS, 1, 10)? {
            self.max_attempts = attempts as u32;
        }

        if let Some(capacity) = EnvParser::parse_usize(EnvVars::CACHE_CAPACITY, 1, 1_000_000)? {
            self.cache_capacity = capacity;
        }

        if let Some(ttl) = EnvParser::parse_u64(EnvVars::CACHE_TTL_SECONDS, 0, 7 * 24 * 3600)? {
            // Zero disables expiry
            self.cache_ttl_seconds = (ttl > 0).then_some(ttl);
        }

        if let Some(threshold) = EnvParser::parse_f64(EnvVars::FUZZY_THRESHOLD, 0.0, 1.0)? {
            self.fuzzy_threshold = threshold;
        }

        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_url(&self.lyrics_base_url, "lyrics base")?;
        ConfigValidator::validate_url(&self.video_search_url, "video search")?;
        ConfigValidator::validate_range(self.http_timeout_seconds, 1, 300, "http timeout seconds")?;
        ConfigValidator::validate_range(self.max_attempts, 1, 10, "max attempts")?;
        ConfigValidator::validate_range(self.cache_capacity, 1, 1_000_000, "cache capacity")?;
        if let Some(ttl) = self.cache_ttl_seconds {
            ConfigValidator::validate_range(ttl, 1, 7 * 24 * 3600, "cache ttl seconds")?;
        }
        ConfigValidator::validate_range(self.fuzzy_threshold, 0.0, 1.0, "fuzzy threshold")?;
        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "musicfinder", "musicfinder")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::default_config_path().ok_or_else(|| {
            MusicFinderError::Internal(anyhow::anyhow!("Failed to determine project directories"))
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings::new(
            self.cache_capacity,
            self.cache_ttl_seconds.map(Duration::from_secs),
        )
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MusicFinderError::Internal(e.into()))
    }
}

fn validate_lyrics_url(url: &str) -> Result<()> {
    ConfigValidator::validate_url(url, "lyrics base")
}

fn validate_video_url(url: &str) -> Result<()> {
    ConfigValidator::validate_url(url, "video search")
}
