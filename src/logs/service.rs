//! Domain-level logging and retrieval over the remote log store.
//!
//! # Responsibilities
//! - Stamp and forward attempt records to the store (fail-soft)
//! - Page through query results with the store's continuation cursor
//! - Separate successful/failed records by outcome flag
//! - Derive aggregate statistics from raw records

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::axiom::{AxiomError, AxiomResult, LogStore};
use crate::logs::records::{CancellationAttemptRecord, CancellationStatistics};
use crate::observability::metrics;

/// Raw-record cap for a statistics computation.
const STATS_FETCH_CAP: usize = 1000;

/// Errors from statistics computation. Unlike ingest, statistics are not
/// best-effort: callers must be able to tell "no data" from "query broke".
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("statistics query over {start}..{end} failed: {source}")]
    Query {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        #[source]
        source: AxiomError,
    },
}

/// Logging and retrieval service for cancellation attempts.
///
/// Holds no mutable state besides its configuration; every operation is an
/// idempotent call against the remote store.
pub struct CancellationLogService {
    store: Arc<dyn LogStore>,
    dataset: String,
}

impl CancellationLogService {
    pub fn new(store: Arc<dyn LogStore>, dataset: impl Into<String>) -> Self {
        Self {
            store,
            dataset: dataset.into(),
        }
    }

    /// Forward one attempt record to the store, stamping the timestamp if
    /// the caller did not.
    ///
    /// Returns whether at least one event was ingested. Never errors;
    /// logging must not disrupt cancellation processing.
    pub async fn record_attempt(&self, mut record: CancellationAttemptRecord) -> bool {
        if record.timestamp.is_none() {
            record.timestamp = Some(Utc::now());
        }

        let event = match serde_json::to_value(&record) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize attempt record");
                return false;
            }
        };

        let status = self.store.ingest(&[event]).await;
        metrics::record_ingest(status.ingested, status.failed);

        if status.ingested == 0 {
            tracing::warn!(
                order_id = record.order_id.as_deref().unwrap_or("unknown"),
                failed = status.failed,
                "Attempt record was not ingested"
            );
            return false;
        }
        true
    }

    /// Successful attempts in the window, newest first.
    ///
    /// Runs ONE query capped at `limit` raw records and filters by outcome
    /// afterwards, so the result can hold fewer than `limit` records even
    /// when more matches exist past the unfiltered page. There is no
    /// backfill re-query; compatibility pins this behavior.
    pub async fn list_successful(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        limit: usize,
    ) -> AxiomResult<Vec<CancellationAttemptRecord>> {
        let records = self.query_range(start_time, end_time, limit).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.success == Some(true))
            .collect())
    }

    /// Failed attempts in the window, newest first. Same capped-fetch
    /// semantics as [`list_successful`](Self::list_successful).
    pub async fn list_failed(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        limit: usize,
    ) -> AxiomResult<Vec<CancellationAttemptRecord>> {
        let records = self.query_range(start_time, end_time, limit).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.success == Some(false))
            .collect())
    }

    /// Aggregate statistics over the window, computed from up to 1000 raw
    /// records. Query failures propagate with context.
    pub async fn compute_statistics(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<CancellationStatistics, StatsError> {
        let records = self
            .query_range(start_time, end_time, STATS_FETCH_CAP)
            .await
            .map_err(|source| StatsError::Query {
                start: start_time,
                end: end_time,
                source,
            })?;
        Ok(CancellationStatistics::from_records(&records))
    }

    /// Fetch up to `limit` raw records in the window, following the store's
    /// continuation cursor across pages and truncating to the limit.
    async fn query_range(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        limit: usize,
    ) -> AxiomResult<Vec<CancellationAttemptRecord>> {
        let apl = format!("['{}'] | sort by _time desc", self.dataset);
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .store
                .query(&apl, start_time, end_time, cursor.as_deref())
                .await?;

            for m in page.matches {
                match serde_json::from_value::<CancellationAttemptRecord>(m.data) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping malformed record from store");
                    }
                }
            }

            if records.len() >= limit {
                records.truncate(limit);
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(records)
    }
}

impl std::fmt::Debug for CancellationLogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationLogService")
            .field("dataset", &self.dataset)
            .finish()
    }
}
