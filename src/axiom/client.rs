//! Axiom HTTP client with timeout and error handling.
//!
//! # Responsibilities
//! - Send batches of structured events to the ingest endpoint
//! - Run APL queries with a time range and continuation cursor
//! - Provide a lightweight reachability probe for the target dataset
//!
//! Ingest and the health probe fail soft; only queries propagate errors.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;

use crate::axiom::types::{AxiomConfig, AxiomError, AxiomResult, IngestStatus, QueryRequest, QueryResult};

/// Typed client over the Axiom ingest/query API.
pub struct AxiomClient {
    http: reqwest::Client,
    base_url: String,
    dataset: String,
}

impl AxiomClient {
    /// Create a new client from validated configuration.
    pub fn new(config: &AxiomConfig) -> AxiomResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| AxiomError::Config(format!("API token is not a valid header value: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url(),
            dataset: config.dataset.clone(),
        })
    }

    /// The dataset this client writes to and probes.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Send a batch of events to the dataset.
    ///
    /// Never returns an error: a transport or backend failure yields a status
    /// with every event counted as failed, and the batch is dropped.
    pub async fn ingest(&self, events: &[Value]) -> IngestStatus {
        if events.is_empty() {
            return IngestStatus::default();
        }

        match self.try_ingest(events).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(
                    dataset = %self.dataset,
                    events = events.len(),
                    error = %e,
                    "Ingest failed, dropping batch"
                );
                IngestStatus::all_failed(events.len() as u64, e.to_string())
            }
        }
    }

    async fn try_ingest(&self, events: &[Value]) -> AxiomResult<IngestStatus> {
        let url = format!("{}/v1/datasets/{}/ingest", self.base_url, self.dataset);
        let response = self.http.post(url).json(events).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AxiomError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Run an APL query over a time range, optionally resuming from a cursor.
    ///
    /// Errors propagate to the caller.
    pub async fn query(
        &self,
        apl: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        cursor: Option<&str>,
    ) -> AxiomResult<QueryResult> {
        let url = format!("{}/v1/datasets/_apl?format=legacy", self.base_url);
        let request = QueryRequest {
            apl,
            start_time,
            end_time,
            cursor,
        };

        let response = self.http.post(url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AxiomError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Check that the target dataset is reachable and present.
    ///
    /// Returns false on any transport error or non-success status, never an
    /// error.
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/v1/datasets/{}", self.base_url, self.dataset);
        match self.http.get(url).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                if !healthy {
                    tracing::warn!(
                        dataset = %self.dataset,
                        status = %response.status(),
                        "Health probe failed: non-success status"
                    );
                }
                healthy
            }
            Err(e) => {
                tracing::warn!(dataset = %self.dataset, error = %e, "Health probe failed: transport error");
                false
            }
        }
    }
}

impl std::fmt::Debug for AxiomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxiomClient")
            .field("base_url", &self.base_url)
            .field("dataset", &self.dataset)
            .finish()
    }
}
