// src/sources/providers/mod.rs
pub mod hacker_news;
pub mod news_api;
pub mod trends;

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::UpstreamConfig;
use crate::error::{UpstreamCause, UpstreamError};
use crate::signal::SourceKind;

/// One shared client for every adapter. No request deadline unless
/// `timeout_secs` is configured.
pub fn build_http_client(cfg: &UpstreamConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .connect_timeout(Duration::from_secs(4));
    if let Some(secs) = cfg.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("building upstream http client")
}

/// Send `request` and return the body of a 2xx response, mapping transport
/// and status failures to an [`UpstreamError`] tagged with `source`.
pub(crate) async fn fetch_body(
    source: SourceKind,
    request: reqwest::RequestBuilder,
) -> Result<String, UpstreamError> {
    let resp = request.send().await.map_err(|e| {
        tracing::warn!(error = %e, %source, "upstream transport error");
        UpstreamError::new(source, UpstreamCause::Transport(e.to_string()))
    })?;

    let status = resp.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), %source, "upstream non-2xx");
        return Err(UpstreamError::new(
            source,
            UpstreamCause::Status(status.as_u16()),
        ));
    }

    resp.text()
        .await
        .map_err(|e| UpstreamError::new(source, UpstreamCause::Transport(e.to_string())))
}

/// Maps a body decode failure from one of the `parse_*` helpers.
pub(crate) fn malformed(source: SourceKind) -> impl Fn(serde_json::Error) -> UpstreamError {
    move |e| UpstreamError::new(source, UpstreamCause::MalformedBody(e.to_string()))
}

pub(crate) fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}
