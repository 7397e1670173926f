//! Fan-out/fan-in over the fetch adapters.
//!
//! Every request in a [`Aggregator::combine`] call is polled concurrently in
//! the calling task and joined before anything is returned. A failing
//! fail-closed fetch aborts the whole aggregation; fail-open sources
//! substitute their default records instead.

use std::collections::BTreeMap;
use std::time::Instant;

use futures_util::future::try_join_all;
use metrics::{counter, histogram};

use crate::error::UpstreamError;
use crate::metrics::{FETCH_MS, UPSTREAM_ERRORS_TOTAL, UPSTREAM_FALLBACK_TOTAL};
use crate::signal::{SignalRecord, SourceKind};
use crate::sources::{FallbackPolicy, SourcePolicies, Sources};

/// One upstream fetch to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Trends,
    FrontPage { limit: u32 },
    Search { query: String, limit: u32 },
    /// `category` is passed through raw; the headline adapter coerces it.
    Headlines { category: String, limit: u32 },
}

impl FetchRequest {
    pub fn source(&self) -> SourceKind {
        match self {
            FetchRequest::Trends => SourceKind::Trend,
            FetchRequest::FrontPage { .. } | FetchRequest::Search { .. } => SourceKind::Discussion,
            FetchRequest::Headlines { .. } => SourceKind::Headline,
        }
    }

    /// Most records this request may yield; trends are uncapped.
    pub fn limit(&self) -> Option<usize> {
        match self {
            FetchRequest::Trends => None,
            FetchRequest::FrontPage { limit }
            | FetchRequest::Search { limit, .. }
            | FetchRequest::Headlines { limit, .. } => Some(*limit as usize),
        }
    }
}

/// Records returned for one [`FetchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBatch {
    pub request: FetchRequest,
    pub records: Vec<SignalRecord>,
    /// True when the records are a fallback substitute.
    pub fallback: bool,
}

impl SourceBatch {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Item counts per source across `batches`.
pub fn counts_by_source<'a>(
    batches: impl IntoIterator<Item = &'a SourceBatch>,
) -> BTreeMap<SourceKind, usize> {
    let mut out = BTreeMap::new();
    for b in batches {
        *out.entry(b.request.source()).or_insert(0) += b.count();
    }
    out
}

/// Title of the first titled record across `batches`, in order.
pub fn first_title<'a>(batches: impl IntoIterator<Item = &'a SourceBatch>) -> Option<&'a str> {
    batches
        .into_iter()
        .flat_map(|b| b.records.iter())
        .map(SignalRecord::title)
        .find(|t| !t.is_empty())
}

/// Joined result of a fan-out, batches in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    pub batches: Vec<SourceBatch>,
}

impl AggregateResult {
    pub fn total(&self) -> usize {
        self.batches.iter().map(SourceBatch::count).sum()
    }

    pub fn into_batches(self) -> Vec<SourceBatch> {
        self.batches
    }
}

pub struct Aggregator {
    sources: Sources,
    policies: SourcePolicies,
}

impl Aggregator {
    pub fn new(sources: Sources) -> Self {
        Self::with_policies(sources, SourcePolicies::default())
    }

    pub fn with_policies(sources: Sources, policies: SourcePolicies) -> Self {
        Self { sources, policies }
    }

    fn adapter_name(&self, request: &FetchRequest) -> &'static str {
        match request.source() {
            SourceKind::Trend => self.sources.trends.name(),
            SourceKind::Discussion => self.sources.discussions.name(),
            SourceKind::Headline => self.sources.headlines.name(),
        }
    }

    /// Run one request through its adapter and the source's fallback policy.
    /// Adapters that return more than the requested limit are capped.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<SourceBatch, UpstreamError> {
        let source = request.source();
        let adapter = self.adapter_name(request);
        let t0 = Instant::now();
        let result = match request {
            FetchRequest::Trends => self.sources.trends.fetch_trends().await,
            FetchRequest::FrontPage { limit } => self.sources.discussions.front_page(*limit).await,
            FetchRequest::Search { query, limit } => {
                self.sources.discussions.search(query, *limit).await
            }
            FetchRequest::Headlines { category, limit } => {
                self.sources.headlines.headlines(category, *limit).await
            }
        };
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!(FETCH_MS, "source" => source.as_str()).record(ms);

        match result {
            Ok(mut records) => {
                if let Some(limit) = request.limit() {
                    records.truncate(limit);
                }
                tracing::debug!(%source, adapter, count = records.len(), ms, "upstream fetch ok");
                Ok(SourceBatch {
                    request: request.clone(),
                    records,
                    fallback: false,
                })
            }
            Err(err) => match self.policies.for_source(source) {
                FallbackPolicy::FailClosed => {
                    counter!(UPSTREAM_ERRORS_TOTAL, "source" => source.as_str()).increment(1);
                    tracing::warn!(error = %err, %source, adapter, "upstream fetch failed");
                    Err(err)
                }
                FallbackPolicy::FailOpenWithDefault(defaults) => {
                    counter!(UPSTREAM_FALLBACK_TOTAL, "source" => source.as_str()).increment(1);
                    tracing::warn!(
                        error = %err,
                        %source,
                        adapter,
                        "upstream fetch failed, using fallback"
                    );
                    Ok(SourceBatch {
                        request: request.clone(),
                        records: defaults.clone(),
                        fallback: true,
                    })
                }
            },
        }
    }

    /// Fan out all `requests`, then join. First fail-closed error wins.
    pub async fn combine(
        &self,
        requests: Vec<FetchRequest>,
    ) -> Result<AggregateResult, UpstreamError> {
        let batches = try_join_all(requests.iter().map(|r| self.fetch(r))).await?;
        Ok(AggregateResult { batches })
    }
}
