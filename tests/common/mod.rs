// tests/common/mod.rs
// Mock adapters and a recording billing sink shared by integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use signals_agent::aggregate::Aggregator;
use signals_agent::billing::{BillingSink, Charge};
use signals_agent::entrypoints::Registry;
use signals_agent::error::{UpstreamCause, UpstreamError};
use signals_agent::signal::{
    DiscussionSignal, HeadlineSignal, SignalRecord, SourceKind, TrendSignal,
};
use signals_agent::sources::{DiscussionSource, HeadlineSource, Sources, TrendSource};
use signals_agent::Dispatcher;

pub fn discussion(i: usize) -> SignalRecord {
    SignalRecord::Discussion(DiscussionSignal {
        id: i.to_string(),
        title: format!("Story {i}"),
        url: format!("https://news.ycombinator.com/item?id={i}"),
        points: 10 * i as i64,
        comments: i as i64,
        author: Some("tester".into()),
        created_at: Some("2024-05-01T10:00:00Z".into()),
    })
}

pub fn headline(category: &str, i: usize) -> SignalRecord {
    SignalRecord::Headline(HeadlineSignal {
        title: format!("{category} headline {i}"),
        description: None,
        url: Some(format!("https://news.test/{category}/{i}")),
        source_name: Some("Test Wire".into()),
        published_at: None,
        image_url: None,
    })
}

pub fn trend(topic: &str) -> SignalRecord {
    SignalRecord::Trend(TrendSignal {
        topic: topic.into(),
        category: "technology".into(),
        platform: "x".into(),
    })
}

/// Scriptable behaviour shared by the mocks.
#[derive(Clone, Default)]
pub struct Script {
    pub fail: bool,
    pub delay: Option<Duration>,
    /// How many records to return regardless of the requested limit.
    pub fixed_len: Option<usize>,
}

#[derive(Default)]
pub struct MockTrends {
    pub script: Script,
    pub calls: AtomicUsize,
}

#[async_trait]
impl TrendSource for MockTrends {
    async fn fetch_trends(&self) -> Result<Vec<SignalRecord>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.script.delay {
            tokio::time::sleep(d).await;
        }
        if self.script.fail {
            return Err(UpstreamError::new(
                SourceKind::Trend,
                UpstreamCause::Status(503),
            ));
        }
        Ok(vec![trend("Live topic A"), trend("Live topic B")])
    }

    fn name(&self) -> &'static str {
        "mock-trends"
    }
}

#[derive(Default)]
pub struct MockDiscussions {
    pub script: Script,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<(String, u32)>>,
}

impl MockDiscussions {
    async fn run(&self, limit: u32) -> Result<Vec<SignalRecord>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.script.delay {
            tokio::time::sleep(d).await;
        }
        if self.script.fail {
            return Err(UpstreamError::new(
                SourceKind::Discussion,
                UpstreamCause::Transport("connection refused".into()),
            ));
        }
        let n = self.script.fixed_len.unwrap_or(limit as usize);
        Ok((1..=n).map(discussion).collect())
    }
}

#[async_trait]
impl DiscussionSource for MockDiscussions {
    async fn front_page(&self, limit: u32) -> Result<Vec<SignalRecord>, UpstreamError> {
        self.queries.lock().unwrap().push(("<front>".into(), limit));
        self.run(limit).await
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SignalRecord>, UpstreamError> {
        self.queries.lock().unwrap().push((query.into(), limit));
        self.run(limit).await
    }

    fn name(&self) -> &'static str {
        "mock-discussions"
    }
}

#[derive(Default)]
pub struct MockHeadlines {
    pub script: Script,
    pub calls: AtomicUsize,
    pub categories: Mutex<Vec<(String, u32)>>,
}

#[async_trait]
impl HeadlineSource for MockHeadlines {
    async fn headlines(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<SignalRecord>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.categories
            .lock()
            .unwrap()
            .push((category.to_string(), limit));
        if let Some(d) = self.script.delay {
            tokio::time::sleep(d).await;
        }
        if self.script.fail {
            return Err(UpstreamError::new(
                SourceKind::Headline,
                UpstreamCause::Status(500),
            ));
        }
        let n = self.script.fixed_len.unwrap_or(limit as usize);
        Ok((1..=n).map(|i| headline(category, i)).collect())
    }

    fn name(&self) -> &'static str {
        "mock-headlines"
    }
}

#[derive(Default)]
pub struct RecordingBilling {
    pub charges: Mutex<Vec<Charge>>,
}

impl BillingSink for RecordingBilling {
    fn record(&self, charge: &Charge) {
        self.charges.lock().unwrap().push(charge.clone());
    }
}

/// Mocks + dispatcher wired together, with handles kept for assertions.
pub struct Harness {
    pub trends: Arc<MockTrends>,
    pub discussions: Arc<MockDiscussions>,
    pub headlines: Arc<MockHeadlines>,
    pub billing: Arc<RecordingBilling>,
    pub dispatcher: Dispatcher,
}

impl Harness {
    pub fn new(trends: Script, discussions: Script, headlines: Script) -> Self {
        let trends = Arc::new(MockTrends {
            script: trends,
            ..Default::default()
        });
        let discussions = Arc::new(MockDiscussions {
            script: discussions,
            ..Default::default()
        });
        let headlines = Arc::new(MockHeadlines {
            script: headlines,
            ..Default::default()
        });
        let billing = Arc::new(RecordingBilling::default());
        let sources = Sources {
            trends: trends.clone(),
            discussions: discussions.clone(),
            headlines: headlines.clone(),
        };
        let dispatcher = Dispatcher::new(
            Registry::new(),
            Aggregator::new(sources),
            billing.clone(),
        );
        Self {
            trends,
            discussions,
            headlines,
            billing,
            dispatcher,
        }
    }

    pub fn healthy() -> Self {
        Self::new(Script::default(), Script::default(), Script::default())
    }

    pub fn upstream_calls(&self) -> usize {
        self.trends.calls.load(Ordering::SeqCst)
            + self.discussions.calls.load(Ordering::SeqCst)
            + self.headlines.calls.load(Ordering::SeqCst)
    }

    pub fn charges(&self) -> Vec<Charge> {
        self.billing.charges.lock().unwrap().clone()
    }
}
