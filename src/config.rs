//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the odds API key) are referenced by env-var name in the config
//! and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::data::{nba_stats, odds, schedule};
use crate::types::{PropError, PropQuery, StatSelector};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSection,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub query: QueryDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub stats_base_url: String,
    /// Season used to query the all-players index.
    pub player_index_season: String,
    pub odds_base_url: String,
    /// Name of the env var holding the odds API key. Unset → no live lines.
    pub odds_api_key_env: Option<String>,
    pub schedule_base_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            stats_base_url: nba_stats::DEFAULT_BASE_URL.to_string(),
            player_index_season: "2025-26".to_string(),
            odds_base_url: odds::DEFAULT_BASE_URL.to_string(),
            odds_api_key_env: None,
            schedule_base_url: schedule::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub game_log_ttl_secs: i64,
    pub schedule_ttl_secs: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            game_log_ttl_secs: 900,
            schedule_ttl_secs: 900,
        }
    }
}

/// Query parameters used when the CLI doesn't override them.
#[derive(Debug, Deserialize, Clone)]
pub struct QueryDefaults {
    pub stat: StatSelector,
    pub line: f64,
    pub rolling_window: usize,
    pub seasons: Vec<String>,
}

impl QueryDefaults {
    pub fn to_query(&self) -> Result<PropQuery, PropError> {
        PropQuery::new(self.stat, self.line, self.rolling_window)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.query.to_query().context("Invalid [query] defaults")?;
        if self.query.seasons.is_empty() {
            anyhow::bail!("[query] seasons must list at least one season");
        }
        if self.cache.game_log_ttl_secs <= 0 || self.cache.schedule_ttl_secs <= 0 {
            anyhow::bail!("[cache] TTLs must be positive");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.app.request_timeout_secs)
    }

    /// The odds API key, if an env var is configured and set.
    pub fn odds_api_key(&self) -> Option<SecretString> {
        self.sources
            .odds_api_key_env
            .as_deref()
            .and_then(|env| Self::resolve_env(env).ok())
            .filter(|key| !key.is_empty())
            .map(SecretString::new)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
