// tests/dispatch.rs
//
// Dispatch runtime behaviour against mock adapters:
// - validation happens before any handler/upstream work
// - unknown keys
// - defaults, output shapes and fetchedAt
// - fixed price reporting
// - fail-open trends vs fail-closed discussions/headlines

mod common;

use common::{Harness, Script};
use serde_json::{json, Value};
use signals_agent::billing::CallOutcome;
use signals_agent::error::{DispatchError, UpstreamCause, Violation};
use signals_agent::SourceKind;

fn validation_field(err: DispatchError) -> (String, &'static str) {
    match err {
        DispatchError::Validation(v) => (v.field, v.violation.rule()),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn search_with_empty_query_never_reaches_upstream() {
    let h = Harness::healthy();
    let err = h
        .dispatcher
        .dispatch("search", json!({ "query": "" }))
        .await
        .unwrap_err();
    assert_eq!(validation_field(err), ("query".to_string(), "min_length"));
    assert_eq!(h.upstream_calls(), 0, "handler must not run on invalid input");
}

#[tokio::test]
async fn invalid_inputs_are_rejected_per_field() {
    let h = Harness::healthy();
    let cases = [
        ("hn-top", json!({ "limit": 51 }), "limit", "range"),
        ("hn-top", json!({ "limit": "ten" }), "limit", "type"),
        ("news", json!({ "category": "sports2" }), "category", "enum"),
        ("news", json!({ "limit": 31 }), "limit", "range"),
        ("search", json!({}), "query", "required"),
        ("search", json!({ "query": "x".repeat(101) }), "query", "max_length"),
        ("news-multi", json!({ "categories": [] }), "categories", "min_items"),
        (
            "news-multi",
            json!({ "categories": ["business", "health", "science", "sports", "general"] }),
            "categories",
            "max_items",
        ),
        (
            "news-multi",
            json!({ "categories": ["health"], "limitPerCategory": 11 }),
            "limitPerCategory",
            "range",
        ),
        ("all-signals", json!({ "newsLimit": 21 }), "newsLimit", "range"),
        ("all-signals", json!({ "newsCategory": "crypto" }), "newsCategory", "enum"),
    ];
    for (key, input, field, rule) in cases {
        let err = h.dispatcher.dispatch(key, input).await.unwrap_err();
        assert_eq!(
            validation_field(err),
            (field.to_string(), rule),
            "case {key}/{field}"
        );
    }
    assert_eq!(h.upstream_calls(), 0);
}

#[tokio::test]
async fn news_multi_rejects_duplicate_categories() {
    let h = Harness::healthy();
    let err = h
        .dispatcher
        .dispatch("news-multi", json!({ "categories": ["health", "health"] }))
        .await
        .unwrap_err();
    match err {
        DispatchError::Validation(v) => {
            assert_eq!(v.field, "categories");
            assert_eq!(
                v.violation,
                Violation::Duplicate {
                    value: "health".into()
                }
            );
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(h.upstream_calls(), 0);
}

#[tokio::test]
async fn unknown_key_is_not_found_and_not_billed() {
    let h = Harness::healthy();
    let err = h
        .dispatcher
        .dispatch("hn_top", Value::Null)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::NotFound { key: "hn_top".into() });
    assert!(h.charges().is_empty());
    assert_eq!(h.upstream_calls(), 0);
}

#[tokio::test]
async fn hn_top_applies_default_limit() {
    let h = Harness::healthy();
    let env = h.dispatcher.dispatch("hn-top", Value::Null).await.unwrap();
    assert_eq!(env.output["count"], 20);
    assert_eq!(env.output["items"].as_array().unwrap().len(), 20);
    assert_eq!(env.output["items"][0]["source"], "discussion");
    assert!(env.output["fetchedAt"].is_string());
    assert_eq!(
        h.discussions.queries.lock().unwrap().clone(),
        vec![("<front>".to_string(), 20)]
    );
}

#[tokio::test]
async fn news_defaults_to_technology() {
    let h = Harness::healthy();
    let env = h.dispatcher.dispatch("news", json!({})).await.unwrap();
    assert_eq!(env.output["category"], "technology");
    assert_eq!(env.output["count"], 15);
    assert_eq!(
        h.headlines.categories.lock().unwrap().clone(),
        vec![("technology".to_string(), 15)]
    );
}

#[tokio::test]
async fn search_passes_query_and_limit() {
    let h = Harness::healthy();
    let env = h
        .dispatcher
        .dispatch("search", json!({ "query": "rust async", "limit": 4 }))
        .await
        .unwrap();
    assert_eq!(env.output["query"], "rust async");
    assert_eq!(env.output["count"], 4);
    assert_eq!(
        h.discussions.queries.lock().unwrap().clone(),
        vec![("rust async".to_string(), 4)]
    );
}

#[tokio::test]
async fn overview_returns_three_of_each_and_sample() {
    let h = Harness::new(
        Script::default(),
        Script {
            fixed_len: Some(10),
            ..Default::default()
        },
        Script {
            fixed_len: Some(10),
            ..Default::default()
        },
    );
    let env = h.dispatcher.dispatch("overview", Value::Null).await.unwrap();
    let out = &env.output;
    assert_eq!(out["headlines"].as_array().unwrap().len(), 3);
    assert_eq!(out["discussions"].as_array().unwrap().len(), 3);
    assert_eq!(out["summary"]["headlines"], 3);
    assert_eq!(out["summary"]["discussions"], 3);
    assert_eq!(out["summary"]["trends"], 2);
    assert_eq!(out["summary"]["trendsFallback"], false);
    assert_eq!(out["sample"], "technology headline 1");
    assert!(out["upgrade"].as_str().is_some_and(|s| !s.is_empty()));
    assert!(!out["fetchedAt"].is_null());
}

#[tokio::test]
async fn overview_returns_fewer_when_upstream_has_fewer() {
    let h = Harness::new(
        Script::default(),
        Script {
            fixed_len: Some(1),
            ..Default::default()
        },
        Script {
            fixed_len: Some(0),
            ..Default::default()
        },
    );
    let env = h.dispatcher.dispatch("overview", Value::Null).await.unwrap();
    assert_eq!(env.output["headlines"].as_array().unwrap().len(), 0);
    assert_eq!(env.output["discussions"].as_array().unwrap().len(), 1);
    assert_eq!(env.output["sample"], "Story 1");
}

#[tokio::test]
async fn failing_trends_use_fallback_records() {
    let h = Harness::new(
        Script {
            fail: true,
            ..Default::default()
        },
        Script::default(),
        Script::default(),
    );
    let env = h.dispatcher.dispatch("overview", Value::Null).await.unwrap();
    let trends = env.output["trends"].as_array().unwrap();
    assert_eq!(trends.len(), 3);
    assert!(trends.iter().all(|t| t["source"] == "trend"));
    assert_eq!(trends[0]["topic"], "AI agents");
    assert_eq!(env.output["summary"]["trends"], 3);
    assert_eq!(env.output["summary"]["trendsFallback"], true);
    assert_eq!(h.charges()[0].outcome, CallOutcome::Success);
}

#[tokio::test]
async fn failing_headlines_fail_the_whole_aggregation() {
    let h = Harness::new(
        Script::default(),
        Script::default(),
        Script {
            fail: true,
            ..Default::default()
        },
    );
    let err = h
        .dispatcher
        .dispatch("all-signals", Value::Null)
        .await
        .unwrap_err();
    match err {
        DispatchError::Upstream(e) => {
            assert_eq!(e.upstream, SourceKind::Headline);
            assert_eq!(e.cause, UpstreamCause::Status(500));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(h.charges()[0].outcome, CallOutcome::UpstreamFailed);
}

#[tokio::test]
async fn failing_discussions_fail_overview() {
    let h = Harness::new(
        Script::default(),
        Script {
            fail: true,
            ..Default::default()
        },
        Script::default(),
    );
    let err = h
        .dispatcher
        .dispatch("overview", Value::Null)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "upstream");
    let env = err.to_envelope();
    assert_eq!(env.error.source, Some(SourceKind::Discussion));
}

#[tokio::test]
async fn news_multi_keeps_request_order_and_sums_totals() {
    let h = Harness::healthy();
    let env = h
        .dispatcher
        .dispatch(
            "news-multi",
            json!({ "categories": ["science", "business", "sports"], "limitPerCategory": 2 }),
        )
        .await
        .unwrap();
    let results = env.output["results"].as_array().unwrap();
    let cats: Vec<&str> = results
        .iter()
        .map(|r| r["category"].as_str().unwrap())
        .collect();
    assert_eq!(cats, vec!["science", "business", "sports"]);
    assert!(results.iter().all(|r| r["count"] == 2));
    assert_eq!(env.output["totals"]["categories"], 3);
    assert_eq!(env.output["totals"]["articles"], 6);
}

#[tokio::test]
async fn all_signals_shape_and_totals() {
    let h = Harness::healthy();
    let env = h
        .dispatcher
        .dispatch(
            "all-signals",
            json!({ "hnLimit": 4, "newsCategory": "health", "newsLimit": 3 }),
        )
        .await
        .unwrap();
    let out = &env.output;
    assert_eq!(out["hackerNews"]["count"], 4);
    assert_eq!(out["news"]["category"], "health");
    assert_eq!(out["news"]["count"], 3);
    assert_eq!(out["totals"], json!({ "hackerNews": 4, "news": 3, "combined": 7 }));
    assert!(out["fetchedAt"].is_string());
}

#[tokio::test]
async fn price_is_fixed_regardless_of_output_size() {
    let empty = Script {
        fixed_len: Some(0),
        ..Default::default()
    };
    let h = Harness::new(Script::default(), empty.clone(), empty);

    let env = h
        .dispatcher
        .dispatch("all-signals", Value::Null)
        .await
        .unwrap();
    assert_eq!(env.output["totals"]["combined"], 0);

    h.dispatcher.dispatch("overview", Value::Null).await.unwrap();
    h.dispatcher.dispatch("news", Value::Null).await.unwrap();
    let _ = h.dispatcher.dispatch("search", json!({ "query": "" })).await;

    let charges: Vec<(&str, u64, CallOutcome)> = h
        .charges()
        .iter()
        .map(|c| (c.key, c.price, c.outcome))
        .collect();
    assert_eq!(
        charges,
        vec![
            ("all-signals", 3000, CallOutcome::Success),
            ("overview", 0, CallOutcome::Success),
            ("news", 1000, CallOutcome::Success),
            ("search", 2000, CallOutcome::ValidationFailed),
        ]
    );
}

#[tokio::test]
async fn fetched_at_is_taken_after_upstream_calls_complete() {
    let h = Harness::new(
        Script::default(),
        Script {
            delay: Some(std::time::Duration::from_millis(40)),
            ..Default::default()
        },
        Script::default(),
    );
    let before = chrono::Utc::now();
    let env = h.dispatcher.dispatch("hn-top", Value::Null).await.unwrap();
    let fetched_at: chrono::DateTime<chrono::Utc> = env.output["fetchedAt"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(
        // fetchedAt has millisecond precision
        fetched_at - before >= chrono::Duration::milliseconds(35),
        "fetchedAt {fetched_at} should follow the 40ms upstream call started at {before}"
    );
}
