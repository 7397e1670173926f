//! Per-entrypoint handlers: typed input → fetch plan → output payload.

use chrono::{SecondsFormat, Utc};
use futures_util::try_join;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{CallContext, EntrypointKind};
use crate::aggregate::{counts_by_source, first_title, Aggregator, FetchRequest};
use crate::error::DispatchError;
use crate::signal::SourceKind;
use crate::sources::NewsCategory;

pub const OVERVIEW_ITEMS: u32 = 3;
pub const UPGRADE_HINT: &str =
    "Call hn-top, news, search, news-multi or all-signals for full, filterable feeds.";

#[derive(Debug, Deserialize)]
struct LimitInput {
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct NewsInput {
    category: NewsCategory,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
    limit: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsMultiInput {
    categories: Vec<NewsCategory>,
    limit_per_category: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllSignalsInput {
    hn_limit: u32,
    news_category: NewsCategory,
    news_limit: u32,
}

/// Timestamp of envelope construction, not of any upstream call.
fn fetched_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn headlines(category: NewsCategory, limit: u32) -> FetchRequest {
    FetchRequest::Headlines {
        category: category.as_str().to_string(),
        limit,
    }
}

impl EntrypointKind {
    /// Run this entrypoint for an already validated call.
    pub async fn handle(
        &self,
        ctx: &CallContext,
        aggregator: &Aggregator,
    ) -> Result<Value, DispatchError> {
        match self {
            EntrypointKind::Overview => overview(aggregator).await,
            EntrypointKind::DiscussionTop => discussion_top(ctx.parse()?, aggregator).await,
            EntrypointKind::Headlines => news(ctx.parse()?, aggregator).await,
            EntrypointKind::Search => search(ctx.parse()?, aggregator).await,
            EntrypointKind::HeadlinesMulti => news_multi(ctx.parse()?, aggregator).await,
            EntrypointKind::AllSignals => all_signals(ctx.parse()?, aggregator).await,
        }
    }
}

async fn overview(aggregator: &Aggregator) -> Result<Value, DispatchError> {
    let head_req = headlines(NewsCategory::Technology, OVERVIEW_ITEMS);
    let front_req = FetchRequest::FrontPage {
        limit: OVERVIEW_ITEMS,
    };
    let trends_req = FetchRequest::Trends;
    let (heads, discussions, trends) = try_join!(
        aggregator.fetch(&head_req),
        aggregator.fetch(&front_req),
        aggregator.fetch(&trends_req),
    )?;
    let batches = [&heads, &discussions, &trends];
    let counts = counts_by_source(batches);
    let count = |kind| counts.get(&kind).copied().unwrap_or(0);
    let sample = first_title(batches).map(str::to_string);

    Ok(json!({
        "summary": {
            "headlines": count(SourceKind::Headline),
            "discussions": count(SourceKind::Discussion),
            "trends": count(SourceKind::Trend),
            "trendsFallback": trends.fallback,
        },
        "sample": sample,
        "headlines": heads.records,
        "discussions": discussions.records,
        "trends": trends.records,
        "upgrade": UPGRADE_HINT,
        "fetchedAt": fetched_at(),
    }))
}

async fn discussion_top(input: LimitInput, aggregator: &Aggregator) -> Result<Value, DispatchError> {
    let batch = aggregator
        .fetch(&FetchRequest::FrontPage { limit: input.limit })
        .await?;
    Ok(json!({
        "items": batch.records,
        "count": batch.records.len(),
        "fetchedAt": fetched_at(),
    }))
}

async fn news(input: NewsInput, aggregator: &Aggregator) -> Result<Value, DispatchError> {
    let batch = aggregator
        .fetch(&headlines(input.category, input.limit))
        .await?;
    Ok(json!({
        "category": input.category,
        "articles": batch.records,
        "count": batch.records.len(),
        "fetchedAt": fetched_at(),
    }))
}

async fn search(input: SearchInput, aggregator: &Aggregator) -> Result<Value, DispatchError> {
    let batch = aggregator
        .fetch(&FetchRequest::Search {
            query: input.query.clone(),
            limit: input.limit,
        })
        .await?;
    Ok(json!({
        "query": input.query,
        "items": batch.records,
        "count": batch.records.len(),
        "fetchedAt": fetched_at(),
    }))
}

async fn news_multi(input: NewsMultiInput, aggregator: &Aggregator) -> Result<Value, DispatchError> {
    let requests = input
        .categories
        .iter()
        .map(|c| headlines(*c, input.limit_per_category))
        .collect();
    let joined = aggregator.combine(requests).await?;
    let total = joined.total();

    let results: Vec<Value> = input
        .categories
        .iter()
        .zip(joined.into_batches())
        .map(|(category, batch)| {
            json!({
                "category": category,
                "count": batch.count(),
                "articles": batch.records,
            })
        })
        .collect();

    Ok(json!({
        "results": results,
        "totals": {
            "categories": input.categories.len(),
            "articles": total,
        },
        "fetchedAt": fetched_at(),
    }))
}

async fn all_signals(input: AllSignalsInput, aggregator: &Aggregator) -> Result<Value, DispatchError> {
    let hn_req = FetchRequest::FrontPage {
        limit: input.hn_limit,
    };
    let news_req = headlines(input.news_category, input.news_limit);
    let (hn, news) = try_join!(aggregator.fetch(&hn_req), aggregator.fetch(&news_req))?;

    let counts = counts_by_source([&hn, &news]);
    let hn_count = counts.get(&SourceKind::Discussion).copied().unwrap_or(0);
    let news_count = counts.get(&SourceKind::Headline).copied().unwrap_or(0);

    Ok(json!({
        "hackerNews": {
            "items": hn.records,
            "count": hn_count,
        },
        "news": {
            "category": input.news_category,
            "articles": news.records,
            "count": news_count,
        },
        "totals": {
            "hackerNews": hn_count,
            "news": news_count,
            "combined": counts.values().sum::<usize>(),
        },
        "fetchedAt": fetched_at(),
    }))
}
