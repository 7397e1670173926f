// src/entrypoints/mod.rs
//! The fixed catalog of priced entrypoints.

pub mod handlers;
pub mod schema;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ValidationError, Violation};
use crate::sources::NewsCategory;
use schema::{FieldRule, InputSchema};

/// Closed set of operations, each backed by one handler in [`handlers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntrypointKind {
    Overview,
    DiscussionTop,
    Headlines,
    Search,
    HeadlinesMulti,
    AllSignals,
}

impl EntrypointKind {
    pub const ALL: [EntrypointKind; 6] = [
        EntrypointKind::Overview,
        EntrypointKind::DiscussionTop,
        EntrypointKind::Headlines,
        EntrypointKind::Search,
        EntrypointKind::HeadlinesMulti,
        EntrypointKind::AllSignals,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            EntrypointKind::Overview => "overview",
            EntrypointKind::DiscussionTop => "hn-top",
            EntrypointKind::Headlines => "news",
            EntrypointKind::Search => "search",
            EntrypointKind::HeadlinesMulti => "news-multi",
            EntrypointKind::AllSignals => "all-signals",
        }
    }

    /// Fixed price in the smallest currency unit.
    pub fn price(&self) -> u64 {
        match self {
            EntrypointKind::Overview => 0,
            EntrypointKind::DiscussionTop | EntrypointKind::Headlines => 1_000,
            EntrypointKind::Search | EntrypointKind::HeadlinesMulti => 2_000,
            EntrypointKind::AllSignals => 3_000,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EntrypointKind::Overview => {
                "Free sample: 3 tech headlines, 3 front-page discussions and current trends"
            }
            EntrypointKind::DiscussionTop => "Front-page Hacker News stories",
            EntrypointKind::Headlines => "Top headlines for one news category",
            EntrypointKind::Search => "Hacker News story search by free-text query",
            EntrypointKind::HeadlinesMulti => {
                "Top headlines for up to 4 categories, fetched in parallel"
            }
            EntrypointKind::AllSignals => {
                "Front-page Hacker News plus category headlines, fetched in parallel"
            }
        }
    }

    pub fn schema(&self) -> InputSchema {
        let categories = NewsCategory::NAMES;
        match self {
            EntrypointKind::Overview => InputSchema::empty(),
            EntrypointKind::DiscussionTop => {
                InputSchema::new(vec![FieldRule::integer("limit", 1, 50, 20)])
            }
            EntrypointKind::Headlines => InputSchema::new(vec![
                FieldRule::one_of("category", categories, "technology"),
                FieldRule::integer("limit", 1, 30, 15),
            ]),
            EntrypointKind::Search => InputSchema::new(vec![
                FieldRule::string("query", 1, 100),
                FieldRule::integer("limit", 1, 30, 15),
            ]),
            EntrypointKind::HeadlinesMulti => InputSchema::new(vec![
                FieldRule::distinct_set("categories", categories, 1, 4),
                FieldRule::integer("limitPerCategory", 1, 10, 5),
            ]),
            EntrypointKind::AllSignals => InputSchema::new(vec![
                FieldRule::integer("hnLimit", 1, 30, 15),
                FieldRule::one_of("newsCategory", categories, "technology"),
                FieldRule::integer("newsLimit", 1, 20, 10),
            ]),
        }
    }
}

/// Static descriptor of one entrypoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrypointDefinition {
    pub key: &'static str,
    pub description: &'static str,
    pub price: u64,
    pub input_schema: InputSchema,
    #[serde(skip)]
    pub kind: EntrypointKind,
}

impl From<EntrypointKind> for EntrypointDefinition {
    fn from(kind: EntrypointKind) -> Self {
        Self {
            key: kind.key(),
            description: kind.description(),
            price: kind.price(),
            input_schema: kind.schema(),
            kind,
        }
    }
}

/// Definitions in catalog order plus a key index. Built once at startup.
#[derive(Debug, Clone)]
pub struct Registry {
    definitions: Vec<EntrypointDefinition>,
    by_key: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn new() -> Self {
        let definitions: Vec<EntrypointDefinition> = EntrypointKind::ALL
            .into_iter()
            .map(EntrypointDefinition::from)
            .collect();
        let by_key = definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.key, i))
            .collect();
        Self {
            definitions,
            by_key,
        }
    }

    pub fn get(&self, key: &str) -> Option<&EntrypointDefinition> {
        self.by_key.get(key).map(|&i| &self.definitions[i])
    }

    pub fn definitions(&self) -> &[EntrypointDefinition] {
        &self.definitions
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated input of the single in-flight call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    pub key: &'static str,
    pub input: Map<String, Value>,
}

impl CallContext {
    pub fn new(key: &'static str, input: Map<String, Value>) -> Self {
        Self { key, input }
    }

    /// Deserialize the validated input into a handler's typed input.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ValidationError> {
        serde_json::from_value(Value::Object(self.input.clone()))
            .map_err(|e| ValidationError::new("input", Violation::Malformed(e.to_string())))
    }
}
