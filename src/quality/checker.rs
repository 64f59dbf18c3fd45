//! Periodic end-to-end quality probe.
//!
//! Exercises the full pipeline on its own schedule, independent of the
//! health monitor: the public HTTP surface for the write path and the log
//! service directly for cross-validation of the read path. A failed cycle
//! is logged and reported; the next cycle still runs on schedule.

use chrono::Utc;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time;
use uuid::Uuid;

use crate::config::QualityCheckConfig;
use crate::logs::CancellationLogService;
use crate::observability::metrics;
use crate::orders::CancellationResponse;

/// Failure of a single quality-cycle step. The first failure aborts the
/// cycle's remaining steps.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("health endpoint reported a problem: {0}")]
    Health(String),

    #[error("synthetic order below the limit was not cancelled: {0}")]
    BelowLimit(String),

    #[error("synthetic order above the limit was unexpectedly cancelled")]
    AboveLimit,

    #[error("recent success record failed validation: {0}")]
    Record(String),

    #[error("statistics failed the consistency check: {0}")]
    Statistics(String),

    #[error("probe transport failed during {step}: {detail}")]
    Transport { step: &'static str, detail: String },
}

impl CycleError {
    /// Step label for structured logging and metrics.
    pub fn step(&self) -> &'static str {
        match self {
            CycleError::Health(_) => "health",
            CycleError::BelowLimit(_) => "cancel_below_limit",
            CycleError::AboveLimit => "cancel_above_limit",
            CycleError::Record(_) => "recent_record",
            CycleError::Statistics(_) => "statistics",
            CycleError::Transport { step, .. } => step,
        }
    }

    fn transport(step: &'static str, e: reqwest::Error) -> Self {
        CycleError::Transport {
            step,
            detail: e.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    healthy: bool,
}

/// Composite end-to-end probe, run on a fixed interval.
pub struct QualityChecker {
    http: reqwest::Client,
    base_url: String,
    logs: Arc<CancellationLogService>,
    interval: Duration,
    cycles: AtomicU64,
}

impl QualityChecker {
    pub fn new(
        config: &QualityCheckConfig,
        logs: Arc<CancellationLogService>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            logs,
            interval: Duration::from_secs(config.interval_secs),
            cycles: AtomicU64::new(0),
        })
    }

    /// Run the check loop until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            target = %self.base_url,
            "Quality checker starting"
        );

        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_and_report().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Quality checker received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn run_and_report(&self) {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        match self.run_cycle().await {
            Ok(()) => {
                metrics::record_quality_cycle(true);
                tracing::info!(cycle, passed = true, "Quality cycle passed");
            }
            Err(e) => {
                metrics::record_quality_cycle(false);
                tracing::error!(
                    cycle,
                    passed = false,
                    step = e.step(),
                    error = %e,
                    "Quality cycle failed"
                );
            }
        }
    }

    /// Execute one full cycle. Public so a cycle can be driven on demand.
    pub async fn run_cycle(&self) -> Result<(), CycleError> {
        self.check_health_endpoint().await?;
        self.check_cancellation_below_limit().await?;
        self.check_cancellation_above_limit().await?;
        self.check_recent_success_record().await?;
        self.check_statistics_consistency().await?;
        Ok(())
    }

    /// Step 1: the health surface must report healthy.
    async fn check_health_endpoint(&self) -> Result<(), CycleError> {
        let url = format!("{}/health/axiom", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CycleError::transport("health", e))?;

        let status = response.status();
        let body: HealthBody = response
            .json()
            .await
            .map_err(|e| CycleError::transport("health", e))?;

        if !status.is_success() || !body.healthy {
            return Err(CycleError::Health(format!(
                "status {}, healthy={}",
                status, body.healthy
            )));
        }
        Ok(())
    }

    /// Step 2: a synthetic order below the threshold must cancel.
    async fn check_cancellation_below_limit(&self) -> Result<(), CycleError> {
        let response = self
            .post_cancel(100.0)
            .await
            .map_err(|e| CycleError::transport("cancel_below_limit", e))?;
        if !response.success {
            return Err(CycleError::BelowLimit(response.message));
        }
        Ok(())
    }

    /// Step 3: a synthetic order above the threshold must be refused.
    async fn check_cancellation_above_limit(&self) -> Result<(), CycleError> {
        let response = self
            .post_cancel(5000.0)
            .await
            .map_err(|e| CycleError::transport("cancel_above_limit", e))?;
        if response.success {
            return Err(CycleError::AboveLimit);
        }
        Ok(())
    }

    async fn post_cancel(&self, amount: f64) -> Result<CancellationResponse, reqwest::Error> {
        let url = format!("{}/cancel", self.base_url);
        let body = serde_json::json!({
            "id": format!("qc-{}", Uuid::new_v4()),
            "totalAmount": amount,
            "status": "PENDING",
        });
        self.http.post(&url).json(&body).send().await?.json().await
    }

    /// Step 4: the most recent success record of the last 24 hours must be
    /// structurally complete. Zero results is not a failure.
    async fn check_recent_success_record(&self) -> Result<(), CycleError> {
        let end = Utc::now();
        let start = end - chrono::Duration::hours(24);
        let records = self
            .logs
            .list_successful(start, end, 1)
            .await
            .map_err(|e| CycleError::Record(format!("query failed: {}", e)))?;

        if let Some(record) = records.first() {
            let missing = record.missing_required_fields();
            if !missing.is_empty() {
                return Err(CycleError::Record(format!(
                    "missing fields: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Step 5: statistics over the last 7 days must be internally
    /// consistent.
    async fn check_statistics_consistency(&self) -> Result<(), CycleError> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(7);
        let stats = self
            .logs
            .compute_statistics(start, end)
            .await
            .map_err(|e| CycleError::Statistics(e.to_string()))?;

        if !stats.is_consistent() {
            return Err(CycleError::Statistics(format!(
                "total={} successful={} failed={} rate={}",
                stats.total_attempts,
                stats.successful_cancellations,
                stats.failed_cancellations,
                stats.success_rate
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for QualityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityChecker")
            .field("base_url", &self.base_url)
            .field("interval", &self.interval)
            .finish()
    }
}
