//! Shared utilities for integration testing.
//!
//! Provides an in-process mock of the Axiom API: ingest appends to a shared
//! vector, queries filter it by the requested time range, and the dataset
//! probe can be flipped unhealthy to exercise failure paths.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Handle on the mock store's state.
#[derive(Clone, Default)]
pub struct MockAxiom {
    events: Arc<Mutex<Vec<Value>>>,
    unhealthy: Arc<AtomicBool>,
}

impl MockAxiom {
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    /// Poll until `count` events have been ingested.
    pub async fn wait_for_events(&self, count: usize) {
        for _ in 0..150 {
            if self.event_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("timed out waiting for {} ingested events", count);
    }
}

/// Start the mock store on an ephemeral port; returns its handle and base
/// URL.
pub async fn start_mock_axiom() -> (MockAxiom, String) {
    let mock = MockAxiom::default();
    let app = Router::new()
        .route("/v1/datasets/_apl", post(query))
        .route("/v1/datasets/{name}", get(dataset_probe))
        .route("/v1/datasets/{name}/ingest", post(ingest))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (mock, format!("http://{}", addr))
}

async fn dataset_probe(State(mock): State<MockAxiom>, Path(name): Path<String>) -> Response {
    if mock.unhealthy.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "dataset unavailable").into_response();
    }
    Json(json!({"name": name})).into_response()
}

async fn ingest(
    State(mock): State<MockAxiom>,
    Path(_name): Path<String>,
    Json(events): Json<Vec<Value>>,
) -> Json<Value> {
    let count = events.len();
    mock.events.lock().unwrap().extend(events);
    Json(json!({"ingested": count, "failed": 0, "failures": []}))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AplRequest {
    #[allow(dead_code)]
    apl: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(default)]
    #[allow(dead_code)]
    cursor: Option<String>,
}

async fn query(State(mock): State<MockAxiom>, Json(request): Json<AplRequest>) -> Json<Value> {
    let mut rows: Vec<(DateTime<Utc>, Value)> = mock
        .events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| {
            let time = event
                .get("_time")
                .and_then(|t| t.as_str())
                .and_then(|t| t.parse::<DateTime<Utc>>().ok())?;
            (time >= request.start_time && time <= request.end_time)
                .then(|| (time, event.clone()))
        })
        .collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0));

    let matches: Vec<Value> = rows
        .into_iter()
        .map(|(_, data)| json!({"data": data}))
        .collect();
    Json(json!({"matches": matches}))
}
