use async_trait::async_trait;
use serde::Deserialize;

use super::{fetch_body, malformed, trim_base};
use crate::error::{UpstreamCause, UpstreamError};
use crate::signal::{normalize_opt, normalize_text, HeadlineSignal, SignalRecord, SourceKind};
use crate::sources::types::{HeadlineSource, NewsCategory};

/// Title the upstream uses for withdrawn articles.
const REMOVED_PLACEHOLDER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<ArticleSource>,
    published_at: Option<String>,
    url_to_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

fn into_record(a: Article) -> Option<SignalRecord> {
    let title = normalize_text(a.title.as_deref().unwrap_or_default());
    if title.is_empty() || title == REMOVED_PLACEHOLDER {
        return None;
    }
    Some(SignalRecord::Headline(HeadlineSignal {
        title,
        description: normalize_opt(a.description.as_deref()),
        url: a.url.filter(|u| !u.trim().is_empty()),
        source_name: normalize_opt(a.source.and_then(|s| s.name).as_deref()),
        published_at: a.published_at,
        image_url: a.url_to_image.filter(|u| !u.trim().is_empty()),
    }))
}

/// Parse a top-headlines body and keep at most `limit` articles.
pub fn parse_articles(body: &str, limit: usize) -> Result<Vec<SignalRecord>, serde_json::Error> {
    let resp: HeadlinesResponse = serde_json::from_str(body)?;
    Ok(resp
        .articles
        .into_iter()
        .filter_map(into_record)
        .take(limit)
        .collect())
}

/// NewsAPI-style `top-headlines` endpoint.
pub struct NewsApiHttp {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    country: String,
}

impl NewsApiHttp {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        country: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            country,
        }
    }
}

#[async_trait]
impl HeadlineSource for NewsApiHttp {
    async fn headlines(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<SignalRecord>, UpstreamError> {
        let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) else {
            return Err(UpstreamError::new(
                SourceKind::Headline,
                UpstreamCause::MissingCredentials,
            ));
        };

        let resolved = NewsCategory::coerce(category);
        if resolved.as_str() != category {
            tracing::debug!(requested = category, %resolved, "headline category coerced");
        }

        let url = format!("{}/top-headlines", trim_base(&self.base_url));
        let request = self
            .client
            .get(url)
            .header("X-Api-Key", key)
            .query(&[
                ("category", resolved.as_str().to_string()),
                ("pageSize", limit.to_string()),
                ("country", self.country.clone()),
            ]);
        let body = fetch_body(SourceKind::Headline, request).await?;
        parse_articles(&body, limit as usize).map_err(malformed(SourceKind::Headline))
    }

    fn name(&self) -> &'static str {
        "news-api"
    }
}
