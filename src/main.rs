//! Service entry point: configuration, wiring, and startup.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cancellation_service::axiom::{AxiomClient, LogStore};
use cancellation_service::config::AppConfig;
use cancellation_service::health::HealthMonitor;
use cancellation_service::http::{AppState, HttpServer};
use cancellation_service::lifecycle::Shutdown;
use cancellation_service::logs::CancellationLogService;
use cancellation_service::observability::metrics;
use cancellation_service::orders::CancellationService;
use cancellation_service::quality::QualityChecker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fail fast: a missing token or invalid region must stop the process
    // before anything binds.
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.observability.log_level)
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind_address = %config.server.bind_address,
        dataset = %config.axiom.dataset,
        region = %config.axiom.region,
        "cancellation-service starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let store: Arc<dyn LogStore> = Arc::new(AxiomClient::new(&config.axiom)?);
    let logs = Arc::new(CancellationLogService::new(
        Arc::clone(&store),
        &config.axiom.dataset,
    ));

    let monitor = Arc::new(HealthMonitor::new(
        Arc::clone(&store),
        Duration::from_secs(config.health_check.interval_secs),
    ));
    if config.health_check.enabled {
        monitor.start();
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    if config.quality_check.enabled {
        let checker = QualityChecker::new(&config.quality_check, Arc::clone(&logs))?;
        let quality_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            checker.run(quality_shutdown).await;
        });
    }

    let state = AppState {
        cancellations: Arc::new(CancellationService::new(Some(Arc::clone(&logs)))),
        logs,
        monitor: Arc::clone(&monitor),
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );
    server.run(listener, shutdown.subscribe()).await?;

    monitor.stop();
    tracing::info!("Shutdown complete");
    Ok(())
}
