//! Log store health monitoring.
//!
//! # States
//! - Unknown: no check has completed yet
//! - Healthy: the store's dataset probe succeeded on the last check
//! - Unhealthy: the last probe failed
//!
//! # State Transitions
//! ```text
//! Unknown → Healthy | Unhealthy: first completed check
//! Healthy ↔ Unhealthy: free transitions, no terminal state
//! ```
//!
//! Subscribers are notified on transitions only; a repeated probe result
//! produces no event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::axiom::LogStore;
use crate::observability::metrics;

/// Health state enum, stored as a u8 (0=Unknown, 1=Healthy, 2=Unhealthy).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthStatus {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthStatus::Healthy,
            2 => HealthStatus::Unhealthy,
            _ => HealthStatus::Unknown,
        }
    }
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Unknown => write!(f, "unknown"),
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Notifications published on the monitor's broadcast channel.
///
/// Every transition emits a `Changed` event followed by the status-specific
/// variant for the new state.
#[derive(Debug, Clone)]
pub enum HealthEvent {
    Changed {
        from: HealthStatus,
        to: HealthStatus,
        at: DateTime<Utc>,
    },
    Healthy {
        at: DateTime<Utc>,
    },
    Unhealthy {
        at: DateTime<Utc>,
    },
}

/// Periodic health monitor for the remote log store.
///
/// Owns its status field exclusively; readers get a lock-free snapshot.
pub struct HealthMonitor {
    store: Arc<dyn LogStore>,
    interval: Duration,
    status: AtomicU8,
    events: broadcast::Sender<HealthEvent>,
    stop: broadcast::Sender<()>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HealthMonitor {
    pub fn new(store: Arc<dyn LogStore>, interval: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        let (stop, _) = broadcast::channel(1);
        Self {
            store,
            interval,
            status: AtomicU8::new(HealthStatus::Unknown as u8),
            events,
            stop,
            task: Mutex::new(None),
        }
    }

    /// Last known status. Synchronous, no I/O.
    pub fn status(&self) -> HealthStatus {
        self.status.load(Ordering::SeqCst).into()
    }

    /// Subscribe to transition events.
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.events.subscribe()
    }

    /// Start the background check loop: one immediate check, then one per
    /// interval. Idempotent; a second call while running is a no-op.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().unwrap();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            tracing::debug!("Health monitor already running");
            return;
        }

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Health monitor starting"
        );

        let monitor = Arc::clone(self);
        let mut stop_rx = self.stop.subscribe();
        *task = Some(tokio::spawn(async move {
            // The first tick completes immediately.
            let mut ticker = time::interval(monitor.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        monitor.check().await;
                    }
                    _ = stop_rx.recv() => {
                        tracing::info!("Health monitor stopped");
                        break;
                    }
                }
            }
        }));
    }

    /// Stop the background loop. Idempotent.
    pub fn stop(&self) {
        if self.task.lock().unwrap().take().is_some() {
            let _ = self.stop.send(());
        }
    }

    /// Run one check against the store and apply the observed status.
    /// Never errors; an unreachable store simply reads as unhealthy.
    pub async fn check(&self) {
        let observed = if self.store.check_health().await {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        self.apply(observed);
    }

    fn apply(&self, observed: HealthStatus) {
        let previous = HealthStatus::from(self.status.swap(observed as u8, Ordering::SeqCst));
        if previous == observed {
            return;
        }

        let at = Utc::now();
        metrics::record_store_health(observed.is_healthy());
        if observed.is_healthy() {
            tracing::info!(from = %previous, to = %observed, "Log store became healthy");
        } else {
            tracing::warn!(from = %previous, to = %observed, "Log store became unhealthy");
        }

        let _ = self.events.send(HealthEvent::Changed {
            from: previous,
            to: observed,
            at,
        });
        let _ = self.events.send(if observed.is_healthy() {
            HealthEvent::Healthy { at }
        } else {
            HealthEvent::Unhealthy { at }
        });
    }
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("interval", &self.interval)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::{AxiomResult, IngestStatus, QueryResult};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use tokio::sync::broadcast::error::TryRecvError;

    /// Probe results played back in order; the last one repeats.
    struct ScriptedProbe {
        results: Mutex<VecDeque<bool>>,
    }

    impl ScriptedProbe {
        fn new(results: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.iter().copied().collect()),
            })
        }
    }

    #[async_trait]
    impl LogStore for ScriptedProbe {
        async fn ingest(&self, _events: &[Value]) -> IngestStatus {
            IngestStatus::default()
        }

        async fn query(
            &self,
            _apl: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _cursor: Option<&str>,
        ) -> AxiomResult<QueryResult> {
            Ok(QueryResult::default())
        }

        async fn check_health(&self) -> bool {
            let mut results = self.results.lock().unwrap();
            if results.len() > 1 {
                results.pop_front().unwrap()
            } else {
                results.front().copied().unwrap_or(false)
            }
        }
    }

    fn drain_changes(rx: &mut broadcast::Receiver<HealthEvent>) -> Vec<(HealthStatus, HealthStatus)> {
        let mut changes = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(HealthEvent::Changed { from, to, .. }) => changes.push((from, to)),
                Ok(_) => {}
                Err(TryRecvError::Empty) => break,
                Err(_) => break,
            }
        }
        changes
    }

    #[tokio::test]
    async fn duplicate_probe_results_do_not_renotify() {
        let monitor = Arc::new(HealthMonitor::new(
            ScriptedProbe::new(&[true, true, false, false, true]),
            Duration::from_secs(60),
        ));
        let mut rx = monitor.subscribe();

        for _ in 0..5 {
            monitor.check().await;
        }

        let changes = drain_changes(&mut rx);
        assert_eq!(
            changes,
            vec![
                (HealthStatus::Unknown, HealthStatus::Healthy),
                (HealthStatus::Healthy, HealthStatus::Unhealthy),
                (HealthStatus::Unhealthy, HealthStatus::Healthy),
            ]
        );
        assert_eq!(monitor.status(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn each_transition_also_emits_a_status_specific_event() {
        let monitor = Arc::new(HealthMonitor::new(
            ScriptedProbe::new(&[true, false]),
            Duration::from_secs(60),
        ));
        let mut rx = monitor.subscribe();

        monitor.check().await;
        monitor.check().await;

        let mut specific = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                HealthEvent::Healthy { .. } => specific.push(true),
                HealthEvent::Unhealthy { .. } => specific.push(false),
                HealthEvent::Changed { .. } => {}
            }
        }
        assert_eq!(specific, vec![true, false]);
    }

    #[tokio::test]
    async fn status_starts_unknown() {
        let monitor = Arc::new(HealthMonitor::new(
            ScriptedProbe::new(&[true]),
            Duration::from_secs(60),
        ));
        assert_eq!(monitor.status(), HealthStatus::Unknown);
        assert!(!monitor.status().is_healthy());
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let monitor = Arc::new(HealthMonitor::new(
            ScriptedProbe::new(&[true]),
            Duration::from_millis(10),
        ));

        monitor.start();
        monitor.start();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(monitor.status(), HealthStatus::Healthy);

        monitor.stop();
        monitor.stop();
    }
}
