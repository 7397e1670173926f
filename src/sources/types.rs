// src/sources/types.rs
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::signal::{SignalRecord, SourceKind};

/// Social-trends feed.
#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn fetch_trends(&self) -> Result<Vec<SignalRecord>, UpstreamError>;
    fn name(&self) -> &'static str;
}

/// Discussion-forum search (front page and free-text query variants).
#[async_trait]
pub trait DiscussionSource: Send + Sync {
    async fn front_page(&self, limit: u32) -> Result<Vec<SignalRecord>, UpstreamError>;
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SignalRecord>, UpstreamError>;
    fn name(&self) -> &'static str;
}

/// Category headlines. `category` is taken raw: implementations re-check it
/// against [`NewsCategory`] and coerce unknown values to the default.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn headlines(&self, category: &str, limit: u32)
        -> Result<Vec<SignalRecord>, UpstreamError>;
    fn name(&self) -> &'static str;
}

/// What happens when a source's fetch fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Propagate the [`UpstreamError`].
    FailClosed,
    /// Substitute these records and report success.
    FailOpenWithDefault(Vec<SignalRecord>),
}

/// Per-source fallback configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePolicies {
    pub trend: FallbackPolicy,
    pub discussion: FallbackPolicy,
    pub headline: FallbackPolicy,
}

impl SourcePolicies {
    pub fn for_source(&self, kind: SourceKind) -> &FallbackPolicy {
        match kind {
            SourceKind::Trend => &self.trend,
            SourceKind::Discussion => &self.discussion,
            SourceKind::Headline => &self.headline,
        }
    }
}

impl Default for SourcePolicies {
    fn default() -> Self {
        Self {
            trend: FallbackPolicy::FailOpenWithDefault(
                crate::sources::providers::trends::fallback_trends(),
            ),
            discussion: FallbackPolicy::FailClosed,
            headline: FallbackPolicy::FailClosed,
        }
    }
}

/// Headline categories accepted by the headlines upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    #[default]
    Technology,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 7] = [
        NewsCategory::Business,
        NewsCategory::Entertainment,
        NewsCategory::General,
        NewsCategory::Health,
        NewsCategory::Science,
        NewsCategory::Sports,
        NewsCategory::Technology,
    ];

    pub const NAMES: &'static [&'static str] = &[
        "business",
        "entertainment",
        "general",
        "health",
        "science",
        "sports",
        "technology",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NewsCategory::Business => "business",
            NewsCategory::Entertainment => "entertainment",
            NewsCategory::General => "general",
            NewsCategory::Health => "health",
            NewsCategory::Science => "science",
            NewsCategory::Sports => "sports",
            NewsCategory::Technology => "technology",
        }
    }

    /// Lenient lookup used by headline adapters: anything unrecognized
    /// becomes [`NewsCategory::Technology`].
    pub fn coerce(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}

impl FromStr for NewsCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NewsCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
