//! Axiom log store client subsystem.
//!
//! # Data Flow
//! ```text
//! Log service / health monitor
//!     → LogStore trait (seam for tests)
//!     → client.rs (reqwest, Bearer auth, timeouts)
//!     → Axiom ingest / APL query / dataset probe
//! ```
//!
//! # Design Decisions
//! - Ingest and health probes fail soft; queries propagate errors
//! - Services hold `Arc<dyn LogStore>` so the store can be scripted in tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

pub mod client;
pub mod types;

pub use client::AxiomClient;
pub use types::{AxiomError, AxiomResult, IngestFailure, IngestStatus, QueryMatch, QueryResult};

/// Remote log store boundary.
///
/// The production implementation is [`AxiomClient`]; tests substitute
/// scripted stores.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Send a batch of events. Must not error; failures are folded into the
    /// returned status.
    async fn ingest(&self, events: &[Value]) -> IngestStatus;

    /// Run a filtered query over a time range. Errors propagate.
    async fn query(
        &self,
        apl: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        cursor: Option<&str>,
    ) -> AxiomResult<QueryResult>;

    /// Probe backend reachability. Must not error.
    async fn check_health(&self) -> bool;
}

#[async_trait]
impl LogStore for AxiomClient {
    async fn ingest(&self, events: &[Value]) -> IngestStatus {
        AxiomClient::ingest(self, events).await
    }

    async fn query(
        &self,
        apl: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        cursor: Option<&str>,
    ) -> AxiomResult<QueryResult> {
        AxiomClient::query(self, apl, start_time, end_time, cursor).await
    }

    async fn check_health(&self) -> bool {
        AxiomClient::check_health(self).await
    }
}
