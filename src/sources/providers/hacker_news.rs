use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_body, malformed, trim_base};
use crate::error::UpstreamError;
use crate::signal::{normalize_opt, normalize_text, DiscussionSignal, SignalRecord, SourceKind};
use crate::sources::types::DiscussionSource;

pub const PERMALINK_BASE: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
    url: Option<String>,
    points: Option<i64>,
    num_comments: Option<i64>,
    author: Option<String>,
    created_at: Option<String>,
}

impl From<Hit> for SignalRecord {
    fn from(hit: Hit) -> Self {
        let url = hit
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("{PERMALINK_BASE}{}", hit.object_id));
        SignalRecord::Discussion(DiscussionSignal {
            title: normalize_text(hit.title.as_deref().unwrap_or_default()),
            url,
            points: hit.points.unwrap_or(0),
            comments: hit.num_comments.unwrap_or(0),
            author: normalize_opt(hit.author.as_deref()),
            created_at: hit.created_at,
            id: hit.object_id,
        })
    }
}

/// Parse a search API body (`{"hits": [...]}`) into discussion records.
pub fn parse_hits(body: &str) -> Result<Vec<SignalRecord>, serde_json::Error> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(resp.hits.into_iter().map(SignalRecord::from).collect())
}

/// Algolia-style HN search API.
pub struct HackerNewsHttp {
    client: reqwest::Client,
    base_url: String,
}

impl HackerNewsHttp {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn run(&self, params: &[(&str, String)]) -> Result<Vec<SignalRecord>, UpstreamError> {
        let url = format!("{}/search", trim_base(&self.base_url));
        let body = fetch_body(SourceKind::Discussion, self.client.get(url).query(params)).await?;
        parse_hits(&body).map_err(malformed(SourceKind::Discussion))
    }
}

#[async_trait]
impl DiscussionSource for HackerNewsHttp {
    async fn front_page(&self, limit: u32) -> Result<Vec<SignalRecord>, UpstreamError> {
        self.run(&[
            ("tags", "front_page".to_string()),
            ("hitsPerPage", limit.to_string()),
        ])
        .await
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SignalRecord>, UpstreamError> {
        self.run(&[
            ("query", query.to_string()),
            ("tags", "story".to_string()),
            ("hitsPerPage", limit.to_string()),
        ])
        .await
    }

    fn name(&self) -> &'static str {
        "hacker-news"
    }
}
