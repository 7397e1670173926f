// src/sources/mod.rs
pub mod providers;
pub mod types;

pub use types::{
    DiscussionSource, FallbackPolicy, HeadlineSource, NewsCategory, SourcePolicies, TrendSource,
};

use std::sync::Arc;

use anyhow::Result;

use crate::config::UpstreamConfig;
use providers::{
    build_http_client, hacker_news::HackerNewsHttp, news_api::NewsApiHttp, trends::TrendsHttp,
};

/// The three adapters an [`crate::aggregate::Aggregator`] fans out to.
#[derive(Clone)]
pub struct Sources {
    pub trends: Arc<dyn TrendSource>,
    pub discussions: Arc<dyn DiscussionSource>,
    pub headlines: Arc<dyn HeadlineSource>,
}

impl Sources {
    /// Build the HTTP-backed adapters sharing one client.
    pub fn from_config(cfg: &UpstreamConfig) -> Result<Self> {
        let client = build_http_client(cfg)?;
        Ok(Self {
            trends: Arc::new(TrendsHttp::new(client.clone(), cfg.trends_url.clone())),
            discussions: Arc::new(HackerNewsHttp::new(client.clone(), cfg.hn_base_url.clone())),
            headlines: Arc::new(NewsApiHttp::new(
                client,
                cfg.news_base_url.clone(),
                cfg.news_api_key.clone(),
                cfg.news_country.clone(),
            )),
        })
    }
}
