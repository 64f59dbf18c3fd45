//! End-to-end tests over the full pipeline: real HTTP server, real Axiom
//! client, in-process mock store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use cancellation_service::axiom::{AxiomClient, LogStore};
use cancellation_service::config::{AxiomConfig, AxiomRegion, QualityCheckConfig};
use cancellation_service::health::{HealthMonitor, HealthStatus};
use cancellation_service::http::{AppState, HttpServer};
use cancellation_service::lifecycle::Shutdown;
use cancellation_service::logs::CancellationLogService;
use cancellation_service::orders::CancellationService;
use cancellation_service::quality::QualityChecker;

mod common;

struct App {
    mock: common::MockAxiom,
    base_url: String,
    monitor: Arc<HealthMonitor>,
    logs: Arc<CancellationLogService>,
    // Keeps the graceful-shutdown channel open for the server task.
    _shutdown: Shutdown,
}

async fn spawn_app() -> App {
    let (mock, store_url) = common::start_mock_axiom().await;

    let axiom_config = AxiomConfig {
        token: "xaat-test".to_string(),
        dataset: "cancellations".to_string(),
        region: AxiomRegion::Us,
        url: Some(store_url),
        timeout_secs: 5,
    };
    let store: Arc<dyn LogStore> = Arc::new(AxiomClient::new(&axiom_config).unwrap());
    let logs = Arc::new(CancellationLogService::new(
        Arc::clone(&store),
        "cancellations",
    ));
    let monitor = Arc::new(HealthMonitor::new(
        Arc::clone(&store),
        Duration::from_secs(60),
    ));

    let state = AppState {
        cancellations: Arc::new(CancellationService::new(Some(Arc::clone(&logs)))),
        logs: Arc::clone(&logs),
        monitor: Arc::clone(&monitor),
    };

    let listener = TcpListener::bind("127.0.0.1:0".parse::<SocketAddr>().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(state, Duration::from_secs(30));
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    App {
        mock,
        base_url: format!("http://{}", addr),
        monitor,
        logs,
        _shutdown: shutdown,
    }
}

#[tokio::test]
async fn cancellation_outcomes_reach_the_store() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(format!("{}/cancel", app.base_url))
        .json(&serde_json::json!({"id": "A1", "totalAmount": 500.0, "status": "PENDING"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["tax"], 50.0);
    assert_eq!(body["order"]["status"], "CANCELED");

    let body: serde_json::Value = client
        .post(format!("{}/cancel", app.base_url))
        .json(&serde_json::json!({"id": "A2", "totalAmount": 1500.0, "status": "PENDING"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], false);
    assert!(body.get("tax").is_none(), "failure must not carry a tax");

    // The log writes are fire-and-forget; both must still arrive.
    app.mock.wait_for_events(2).await;
    let events = app.mock.events();
    let success = events
        .iter()
        .find(|e| e["orderId"] == "A1")
        .expect("success record ingested");
    assert_eq!(success["success"], true);
    assert_eq!(success["fee"], 50.0);
    assert!(success.get("_time").is_some(), "timestamp must be stamped");
    assert!(success.get("clientIp").is_some());
    let failure = events
        .iter()
        .find(|e| e["orderId"] == "A2")
        .expect("failure record ingested");
    assert_eq!(failure["success"], false);
    assert_eq!(failure["failureReason"], "amount above limit");
    assert!(failure.get("fee").is_none());
}

#[tokio::test]
async fn listings_filter_by_outcome_and_stats_add_up() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for (id, amount) in [("A1", 500.0), ("A2", 1500.0), ("A3", 200.0)] {
        client
            .post(format!("{}/cancel", app.base_url))
            .json(&serde_json::json!({"id": id, "totalAmount": amount, "status": "PENDING"}))
            .send()
            .await
            .unwrap();
    }
    app.mock.wait_for_events(3).await;

    let successful: Vec<serde_json::Value> = client
        .get(format!("{}/logs/cancellations/successful", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(successful.len(), 2);
    assert!(successful.iter().all(|r| r["success"] == true));

    let failed: Vec<serde_json::Value> = client
        .get(format!("{}/logs/cancellations/failed", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["orderId"], "A2");

    let stats: serde_json::Value = client
        .get(format!("{}/stats/cancellations", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalAttempts"], 3);
    assert_eq!(stats["successfulCancellations"], 2);
    assert_eq!(stats["failedCancellations"], 1);
    assert_eq!(stats["topFailureReason"], "amount above limit");
    let rate = stats["successRate"].as_f64().unwrap();
    assert!((rate - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn amount_validation_guards_the_eligibility_endpoint() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/can-cancel/A1/12.345", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("error").is_some());

    let body: serde_json::Value = client
        .get(format!("{}/can-cancel/A1/999.99", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["canCancel"], true);

    let body: serde_json::Value = client
        .get(format!("{}/can-cancel/A1/1000.01", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["canCancel"], false);
}

#[tokio::test]
async fn health_endpoint_tracks_monitor_state() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let url = format!("{}/health/axiom", app.base_url);

    // No check has run yet: unknown reads as unavailable.
    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "unknown");

    app.monitor.check().await;
    assert_eq!(app.monitor.status(), HealthStatus::Healthy);
    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["healthy"], true);

    app.mock.set_healthy(false);
    app.monitor.check().await;
    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["healthy"], false);
}

#[tokio::test]
async fn quality_cycle_passes_against_a_live_pipeline() {
    let app = spawn_app().await;
    app.monitor.check().await;

    let config = QualityCheckConfig {
        enabled: true,
        interval_secs: 300,
        base_url: app.base_url.clone(),
    };
    let checker = QualityChecker::new(&config, Arc::clone(&app.logs)).unwrap();

    checker.run_cycle().await.expect("cycle should pass");

    // The synthetic probes leave real records behind.
    app.mock.wait_for_events(2).await;
}

#[tokio::test]
async fn quality_cycle_fails_when_the_store_is_down() {
    let app = spawn_app().await;
    app.mock.set_healthy(false);
    app.monitor.check().await;

    let config = QualityCheckConfig {
        enabled: true,
        interval_secs: 300,
        base_url: app.base_url.clone(),
    };
    let checker = QualityChecker::new(&config, Arc::clone(&app.logs)).unwrap();

    let err = checker.run_cycle().await.unwrap_err();
    assert_eq!(err.step(), "health");
}
