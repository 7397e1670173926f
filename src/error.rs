//! Error taxonomy shared by adapters, the aggregator and the dispatch runtime.

use serde::Serialize;
use thiserror::Error;

use crate::signal::SourceKind;

/// Why an upstream fetch did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamCause {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream responded with status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("missing credentials for upstream")]
    MissingCredentials,
}

/// A fetch adapter's call failed and no fallback absorbed it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{upstream} upstream failed: {cause}")]
pub struct UpstreamError {
    pub upstream: SourceKind,
    pub cause: UpstreamCause,
}

impl UpstreamError {
    pub fn new(upstream: SourceKind, cause: UpstreamCause) -> Self {
        Self { upstream, cause }
    }
}

/// The specific rule a field broke during input validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("is required")]
    Missing,

    #[error("must be of type {expected}")]
    WrongType { expected: &'static str },

    #[error("must be between {min} and {max}")]
    OutOfRange { min: i64, max: i64 },

    #[error("must be at least {min} characters long")]
    TooShort { min: usize },

    #[error("must be at most {max} characters long")]
    TooLong { max: usize },

    #[error("must be one of {}", allowed.join(", "))]
    NotAllowed { allowed: &'static [&'static str] },

    #[error("must contain at least {min} items")]
    TooFewItems { min: usize },

    #[error("must contain at most {max} items")]
    TooManyItems { max: usize },

    #[error("contains duplicate value `{value}`")]
    Duplicate { value: String },

    #[error("could not be parsed: {0}")]
    Malformed(String),
}

impl Violation {
    /// Short machine-readable rule name.
    pub fn rule(&self) -> &'static str {
        match self {
            Violation::Missing => "required",
            Violation::WrongType { .. } => "type",
            Violation::OutOfRange { .. } => "range",
            Violation::TooShort { .. } => "min_length",
            Violation::TooLong { .. } => "max_length",
            Violation::NotAllowed { .. } => "enum",
            Violation::TooFewItems { .. } => "min_items",
            Violation::TooManyItems { .. } => "max_items",
            Violation::Duplicate { .. } => "distinct",
            Violation::Malformed(_) => "malformed",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid `{field}`: {violation}")]
pub struct ValidationError {
    pub field: String,
    pub violation: Violation,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, violation: Violation) -> Self {
        Self {
            field: field.into(),
            violation,
        }
    }
}

/// Everything a call to [`crate::dispatch::Dispatcher::dispatch`] can fail with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown entrypoint `{key}`")]
    NotFound { key: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::NotFound { .. } => "not_found",
            DispatchError::Validation(_) => "validation",
            DispatchError::Upstream(_) => "upstream",
        }
    }

    /// Error envelope shown to callers. Only kind, message, field/rule and
    /// upstream source are exposed.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let mut body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
            field: None,
            rule: None,
            source: None,
        };
        match self {
            DispatchError::NotFound { .. } => {}
            DispatchError::Validation(err) => {
                body.field = Some(err.field.clone());
                body.rule = Some(err.violation.rule());
            }
            DispatchError::Upstream(err) => {
                body.source = Some(err.upstream);
            }
        }
        ErrorEnvelope { error: body }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
}
