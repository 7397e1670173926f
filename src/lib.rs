// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod billing;
pub mod config;
pub mod dispatch;
pub mod entrypoints;
pub mod error;
pub mod metrics;
pub mod signal;
pub mod sources;

use std::sync::Arc;

use axum::Router;
use tracing::info;

pub use crate::api::router;
pub use crate::dispatch::{Dispatcher, Envelope};
pub use crate::error::{DispatchError, UpstreamError, ValidationError};
pub use crate::signal::{SignalRecord, SourceKind};

use crate::aggregate::Aggregator;
use crate::billing::LogBilling;
use crate::config::AppConfig;
use crate::entrypoints::Registry;
use crate::sources::Sources;

/// Build the dispatcher for `cfg` with HTTP adapters and log billing.
pub fn build_dispatcher(cfg: &AppConfig) -> anyhow::Result<Dispatcher> {
    let sources = Sources::from_config(&cfg.upstream)?;
    Ok(Dispatcher::new(
        Registry::new(),
        Aggregator::new(sources),
        Arc::new(LogBilling),
    ))
}

/// Full in-process app: entrypoint routes plus `/metrics`.
pub fn app_with_config(cfg: &AppConfig) -> anyhow::Result<Router> {
    let metrics = metrics::Metrics::init()?;
    let dispatcher = build_dispatcher(cfg)?;
    info!(
        entrypoints = dispatcher.registry().definitions().len(),
        trends_url = %cfg.upstream.trends_url,
        timeout_secs = ?cfg.upstream.timeout_secs,
        "signals agent ready"
    );
    let state = api::AppState {
        dispatcher: Arc::new(dispatcher),
    };
    Ok(api::router(state).merge(metrics.router()))
}

/// Same as [`app_with_config`], loading config from file/env.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = AppConfig::load()?;
    app_with_config(&cfg)
}
