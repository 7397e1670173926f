use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_body, malformed};
use crate::error::UpstreamError;
use crate::signal::{normalize_text, SignalRecord, SourceKind, TrendSignal};
use crate::sources::types::TrendSource;

#[derive(Debug, Deserialize)]
struct RawTrend {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Records substituted when the trends feed is unavailable.
pub fn fallback_trends() -> Vec<SignalRecord> {
    [
        ("x", "AI agents", "technology"),
        ("reddit", "Rust in production", "technology"),
        ("x", "Interest rate outlook", "business"),
    ]
    .into_iter()
    .map(|(platform, topic, category)| {
        SignalRecord::Trend(TrendSignal {
            topic: topic.to_string(),
            category: category.to_string(),
            platform: platform.to_string(),
        })
    })
    .collect()
}

/// Parse the trends feed body: a JSON array of `{source, topic, category}`.
/// Entries without a topic are skipped.
pub fn parse_trends(body: &str) -> Result<Vec<SignalRecord>, serde_json::Error> {
    let raw: Vec<RawTrend> = serde_json::from_str(body)?;
    Ok(raw.into_iter().filter_map(into_record).collect())
}

fn into_record(raw: RawTrend) -> Option<SignalRecord> {
    let topic = normalize_text(raw.topic.as_deref()?);
    if topic.is_empty() {
        return None;
    }
    Some(SignalRecord::Trend(TrendSignal {
        topic,
        category: raw
            .category
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "general".to_string()),
        platform: raw
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
    }))
}

pub struct TrendsHttp {
    client: reqwest::Client,
    url: String,
}

impl TrendsHttp {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl TrendSource for TrendsHttp {
    async fn fetch_trends(&self) -> Result<Vec<SignalRecord>, UpstreamError> {
        let body = fetch_body(SourceKind::Trend, self.client.get(&self.url)).await?;
        parse_trends(&body).map_err(malformed(SourceKind::Trend))
    }

    fn name(&self) -> &'static str {
        "trends"
    }
}
