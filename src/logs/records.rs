//! Cancellation attempt records and derived statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One structured entry per cancellation attempt, success or failure.
///
/// The write side goes through [`succeeded`](Self::succeeded) /
/// [`failed`](Self::failed), which keep the fee/failure-reason fields
/// consistent with the outcome. The read side is lenient: rows come back
/// from the remote store and may be missing any field, including the
/// outcome flag itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancellationAttemptRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<String>,

    /// Outcome flag. Rows lacking it belong to neither outcome bucket but
    /// still count toward `totalAttempts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Fee charged; present only on successful attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,

    /// Ingestion timestamp, auto-indexed by the store under `_time`.
    #[serde(rename = "_time", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Failure reason; present only on failed attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl CancellationAttemptRecord {
    /// Record for a cancellation that went through.
    pub fn succeeded(
        order_id: impl Into<String>,
        order_amount: f64,
        order_status: impl Into<String>,
        message: impl Into<String>,
        fee: f64,
    ) -> Self {
        Self {
            order_id: Some(order_id.into()),
            order_amount: Some(order_amount),
            order_status: Some(order_status.into()),
            success: Some(true),
            message: Some(message.into()),
            fee: Some(fee),
            ..Default::default()
        }
    }

    /// Record for a cancellation that was refused or could not proceed.
    pub fn failed(
        order_id: impl Into<String>,
        order_amount: f64,
        order_status: impl Into<String>,
        message: impl Into<String>,
        failure_reason: impl Into<String>,
    ) -> Self {
        Self {
            order_id: Some(order_id.into()),
            order_amount: Some(order_amount),
            order_status: Some(order_status.into()),
            success: Some(false),
            message: Some(message.into()),
            failure_reason: Some(failure_reason.into()),
            ..Default::default()
        }
    }

    /// Attach the requesting client's address and user agent.
    pub fn with_client(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.client_ip = ip;
        self.user_agent = user_agent;
        self
    }

    /// Fields a well-formed success record must carry, reported by name
    /// when absent. Used by the quality checker's structural validation.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.order_id.is_none() {
            missing.push("orderId");
        }
        if self.order_amount.is_none() {
            missing.push("orderAmount");
        }
        if self.order_status.is_none() {
            missing.push("orderStatus");
        }
        if self.success.is_none() {
            missing.push("success");
        }
        if self.message.is_none() {
            missing.push("message");
        }
        if self.timestamp.is_none() {
            missing.push("_time");
        }
        if self.success == Some(true) && self.fee.is_none() {
            missing.push("fee");
        }
        missing
    }
}

/// Aggregate statistics over a window of attempt records.
///
/// Derived on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancellationStatistics {
    pub total_attempts: u64,
    pub successful_cancellations: u64,
    pub failed_cancellations: u64,
    pub success_rate: f64,
    pub total_fees_collected: f64,
    pub average_fee: f64,
    pub average_order_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_failure_reason: Option<String>,
}

impl CancellationStatistics {
    /// Compute aggregates over raw records.
    ///
    /// Rows without a boolean outcome count toward `total_attempts` only;
    /// the outcome buckets exclude them, so the sum of the buckets can fall
    /// short of the total.
    pub fn from_records(records: &[CancellationAttemptRecord]) -> Self {
        let total_attempts = records.len() as u64;
        if total_attempts == 0 {
            return Self::default();
        }

        let successful_cancellations =
            records.iter().filter(|r| r.success == Some(true)).count() as u64;
        let failed_cancellations =
            records.iter().filter(|r| r.success == Some(false)).count() as u64;

        let total_fees_collected: f64 = records.iter().filter_map(|r| r.fee).sum();
        let average_fee = if successful_cancellations > 0 {
            total_fees_collected / successful_cancellations as f64
        } else {
            0.0
        };

        let amount_sum: f64 = records.iter().filter_map(|r| r.order_amount).sum();
        let average_order_amount = amount_sum / total_attempts as f64;

        Self {
            total_attempts,
            successful_cancellations,
            failed_cancellations,
            success_rate: successful_cancellations as f64 / total_attempts as f64,
            total_fees_collected,
            average_fee,
            average_order_amount,
            top_failure_reason: top_failure_reason(records),
        }
    }

    /// Internal consistency check used by the quality checker: the outcome
    /// buckets must add up to the total and the rate must be a proportion.
    pub fn is_consistent(&self) -> bool {
        self.successful_cancellations + self.failed_cancellations == self.total_attempts
            && (0.0..=1.0).contains(&self.success_rate)
    }
}

/// Mode of the failure-reason values. Ties resolve to the reason that
/// reached the winning count first.
fn top_failure_reason(records: &[CancellationAttemptRecord]) -> Option<String> {
    let mut counts: Vec<(&str, u64)> = Vec::new();
    for record in records {
        if record.success != Some(false) {
            continue;
        }
        let Some(reason) = record.failure_reason.as_deref() else {
            continue;
        };
        match counts.iter_mut().find(|(r, _)| *r == reason) {
            Some((_, n)) => *n += 1,
            None => counts.push((reason, 1)),
        }
    }

    let mut top: Option<(&str, u64)> = None;
    for (reason, count) in counts {
        if top.map_or(true, |(_, best)| count > best) {
            top = Some((reason, count));
        }
    }
    top.map(|(reason, _)| reason.to_string())
}
