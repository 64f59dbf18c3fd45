//! Axiom wire types and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export the connection config from the config module to avoid duplication
pub use crate::config::schema::{AxiomConfig, AxiomRegion};

/// Outcome of a batch ingest call.
///
/// Ingest never raises: transport and backend failures are folded into the
/// failed count so logging can never disrupt request processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestStatus {
    /// Number of events the store accepted.
    pub ingested: u64,

    /// Number of events that were not accepted.
    pub failed: u64,

    /// Per-event failure details, when the store reports any.
    pub failures: Vec<IngestFailure>,
}

impl IngestStatus {
    /// Status representing a batch that was lost in its entirety.
    pub fn all_failed(count: u64, error: String) -> Self {
        Self {
            ingested: 0,
            failed: count,
            failures: vec![IngestFailure { error }],
        }
    }
}

/// A single ingest failure reported by the store or the transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestFailure {
    pub error: String,
}

/// Request body for an APL query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    /// APL filter expression, e.g. `['dataset'] | sort by _time desc`.
    pub apl: &'a str,

    /// Inclusive start of the time range.
    pub start_time: DateTime<Utc>,

    /// Exclusive end of the time range.
    pub end_time: DateTime<Utc>,

    /// Continuation cursor from a previous page, when resuming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<&'a str>,
}

/// One page of query results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
    /// Raw matching rows.
    pub matches: Vec<QueryMatch>,

    /// Continuation cursor. Absent when the store has no further results.
    pub next_cursor: Option<String>,
}

/// A single matching row. The record payload lives under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    pub data: serde_json::Value,
}

/// Errors that can occur on the query path.
///
/// Ingest and health probes deliberately do not surface these; queries do,
/// because callers must distinguish "no data" from "query broke".
#[derive(Debug, Error)]
pub enum AxiomError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("request to Axiom failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Axiom API error: status {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode Axiom response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client could not be constructed from its configuration.
    #[error("invalid Axiom configuration: {0}")]
    Config(String),
}

/// Result type for Axiom operations.
pub type AxiomResult<T> = Result<T, AxiomError>;
