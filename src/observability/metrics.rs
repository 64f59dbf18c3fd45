//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cancellation_attempts_total` (counter): attempts by outcome
//! - `axiom_events_ingested_total` / `axiom_events_failed_total` (counters)
//! - `axiom_store_health` (gauge): 1=healthy, 0=unhealthy
//! - `quality_cycles_total` (counter): cycles by result
//! - `http_request_duration_seconds` (histogram): latency by method/status
//!
//! Recording helpers are safe to call before `init`; they are no-ops until
//! a recorder is installed.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on the given address.
pub fn init(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
            describe_metrics();
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!(
        "cancellation_attempts_total",
        "Cancellation attempts processed, labeled by outcome"
    );
    describe_counter!(
        "axiom_events_ingested_total",
        "Attempt records accepted by the log store"
    );
    describe_counter!(
        "axiom_events_failed_total",
        "Attempt records the log store did not accept"
    );
    describe_gauge!(
        "axiom_store_health",
        "Log store reachability: 1 healthy, 0 unhealthy"
    );
    describe_counter!(
        "quality_cycles_total",
        "Quality checker cycles, labeled by result"
    );
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency by method and status"
    );
}

/// Count one cancellation attempt.
pub fn record_cancellation(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("cancellation_attempts_total", "outcome" => outcome).increment(1);
}

/// Count an ingest call's accepted/rejected events.
pub fn record_ingest(ingested: u64, failed: u64) {
    counter!("axiom_events_ingested_total").increment(ingested);
    counter!("axiom_events_failed_total").increment(failed);
}

/// Record the store's health as observed by the monitor.
pub fn record_store_health(healthy: bool) {
    gauge!("axiom_store_health").set(if healthy { 1.0 } else { 0.0 });
}

/// Count one quality cycle.
pub fn record_quality_cycle(passed: bool) {
    let result = if passed { "pass" } else { "fail" };
    counter!("quality_cycles_total", "result" => result).increment(1);
}

/// Record one served HTTP request.
pub fn record_request(method: &str, status: u16, started: Instant) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}
