//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all public endpoints
//! - Wire up middleware (request ID, tracing, timeout, request metrics)
//! - Serve with graceful shutdown on the lifecycle channel

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::health::HealthMonitor;
use crate::http::handlers;
use crate::logs::CancellationLogService;
use crate::observability::metrics;
use crate::orders::CancellationService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cancellations: Arc<CancellationService>,
    pub logs: Arc<CancellationLogService>,
    pub monitor: Arc<HealthMonitor>,
}

/// HTTP server for the cancellation service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the assembled application state.
    pub fn new(state: AppState, request_timeout: Duration) -> Self {
        let router = Router::new()
            .route("/cancel", post(handlers::cancel_order))
            .route("/can-cancel/{id}/{total_amount}", get(handlers::can_cancel))
            .route("/health/axiom", get(handlers::axiom_health))
            .route("/stats/cancellations", get(handlers::cancellation_stats))
            .route(
                "/logs/cancellations/successful",
                get(handlers::successful_cancellations),
            )
            .route(
                "/logs/cancellations/failed",
                get(handlers::failed_cancellations),
            )
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(request_timeout))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(middleware::from_fn(track_metrics)),
            );
        Self { router }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Record latency and status for every served request.
async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), started);
    response
}
