//! Normalized signal records produced by the fetch adapters.

use std::fmt;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which upstream a record (or an error) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Trend,
    Discussion,
    Headline,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Trend => "trend",
            SourceKind::Discussion => "discussion",
            SourceKind::Headline => "headline",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSignal {
    pub topic: String,
    pub category: String,
    /// Platform the trend was observed on (`source` in the upstream feed).
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionSignal {
    pub id: String,
    pub title: String,
    pub url: String,
    pub points: i64,
    pub comments: i64,
    pub author: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineSignal {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source_name: Option<String>,
    pub published_at: Option<String>,
    pub image_url: Option<String>,
}

/// A normalized item from any upstream, tagged by `source` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SignalRecord {
    Trend(TrendSignal),
    Discussion(DiscussionSignal),
    Headline(HeadlineSignal),
}

impl SignalRecord {
    pub fn source(&self) -> SourceKind {
        match self {
            SignalRecord::Trend(_) => SourceKind::Trend,
            SignalRecord::Discussion(_) => SourceKind::Discussion,
            SignalRecord::Headline(_) => SourceKind::Headline,
        }
    }

    /// Display title: the trend topic or the item title.
    pub fn title(&self) -> &str {
        match self {
            SignalRecord::Trend(t) => &t.topic,
            SignalRecord::Discussion(d) => &d.title,
            SignalRecord::Headline(h) => &h.title,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            SignalRecord::Trend(_) => None,
            SignalRecord::Discussion(d) => Some(&d.url),
            SignalRecord::Headline(h) => h.url.as_deref(),
        }
    }
}

/// Normalize upstream text: decode HTML entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z][^>]*>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Like [`normalize_text`], but maps empty results to `None`.
pub fn normalize_opt(s: Option<&str>) -> Option<String> {
    s.map(normalize_text).filter(|t| !t.is_empty())
}
