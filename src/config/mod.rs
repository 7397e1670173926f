// src/config/mod.rs
//! Process configuration: optional TOML file, then env overrides.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "AGENT_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";

pub const ENV_HN_BASE_URL: &str = "HN_API_BASE_URL";
pub const ENV_NEWS_BASE_URL: &str = "NEWS_API_BASE_URL";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_NEWS_COUNTRY: &str = "NEWS_COUNTRY";
pub const ENV_TRENDS_URL: &str = "TRENDS_URL";
pub const ENV_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "UPSTREAM_USER_AGENT";

fn default_hn_base_url() -> String {
    "https://hn.algolia.com/api/v1".to_string()
}
fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}
fn default_news_country() -> String {
    "us".to_string()
}
fn default_trends_url() -> String {
    "https://trends.example.com/api/trending".to_string()
}
fn default_user_agent() -> String {
    concat!("signals-agent/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    #[serde(default = "default_hn_base_url")]
    pub hn_base_url: String,
    #[serde(default = "default_news_base_url")]
    pub news_base_url: String,
    /// Usually supplied via `NEWS_API_KEY` rather than the file.
    #[serde(default)]
    pub news_api_key: Option<String>,
    #[serde(default = "default_news_country")]
    pub news_country: String,
    #[serde(default = "default_trends_url")]
    pub trends_url: String,
    /// Whole-request deadline. Unset means upstream calls are unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            hn_base_url: default_hn_base_url(),
            news_base_url: default_news_base_url(),
            news_api_key: None,
            news_country: default_news_country(),
            trends_url: default_trends_url(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load config using env var + fallbacks, then apply env overrides:
    /// 1) $AGENT_CONFIG_PATH (must exist)
    /// 2) config/agent.toml
    /// 3) built-in defaults
    pub fn load() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.upstream.apply_env()?;
        Ok(cfg)
    }
}

impl UpstreamConfig {
    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_non_empty(ENV_HN_BASE_URL) {
            self.hn_base_url = v;
        }
        if let Some(v) = env_non_empty(ENV_NEWS_BASE_URL) {
            self.news_base_url = v;
        }
        if let Some(v) = env_non_empty(ENV_NEWS_API_KEY) {
            self.news_api_key = Some(v);
        }
        if let Some(v) = env_non_empty(ENV_NEWS_COUNTRY) {
            self.news_country = v.to_ascii_lowercase();
        }
        if let Some(v) = env_non_empty(ENV_TRENDS_URL) {
            self.trends_url = v;
        }
        if let Some(v) = env_non_empty(ENV_USER_AGENT) {
            self.user_agent = v;
        }
        if let Some(v) = env_non_empty(ENV_TIMEOUT_SECS) {
            let secs: u64 = v
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
            self.timeout_secs = (secs > 0).then_some(secs);
        }
        Ok(())
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
