//! Public HTTP endpoint handlers.
//!
//! # Responsibilities
//! - Validate and decode request parameters
//! - Dispatch to the domain, log, and health subsystems
//! - Map subsystem failures onto HTTP statuses: 400 for validation, 500
//!   (generic body) for backend query failures, 503 for an unhealthy store

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::LazyLock;

use crate::http::server::AppState;
use crate::orders::{can_cancel_order, CancellationResponse, Order, OrderStatus, RequestMeta, CANCELLATION_LIMIT};

/// Default page size for the log-listing endpoints.
const DEFAULT_LOG_LIMIT: usize = 100;

/// Hard cap on the log-listing page size; larger requests are clamped.
const MAX_LOG_LIMIT: usize = 1000;

/// Positive amount with at most two decimal places.
static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("amount pattern is valid"));

/// Body of `POST /cancel`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub id: String,
    pub total_amount: f64,
    pub status: OrderStatus,
}

/// Time window + page size query parameters shared by the read endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<usize>,
}

/// `POST /cancel`
pub async fn cancel_order(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<CancelRequest>,
) -> Json<CancellationResponse> {
    let meta = RequestMeta {
        client_ip: Some(addr.ip().to_string()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    };
    let order = Order {
        id: request.id,
        total_amount: request.total_amount,
        status: request.status,
    };
    Json(state.cancellations.cancel(order, meta))
}

/// `GET /can-cancel/{id}/{totalAmount}`
pub async fn can_cancel(Path((id, total_amount)): Path<(String, String)>) -> Response {
    if !AMOUNT_PATTERN.is_match(&total_amount) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "totalAmount must be a positive number with at most two decimal places"
            })),
        )
            .into_response();
    }
    let amount: f64 = match total_amount.parse() {
        Ok(amount) => amount,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "totalAmount is not a valid number"})),
            )
                .into_response();
        }
    };

    let eligible = can_cancel_order(amount);
    let message = if eligible {
        format!("Order {} can be cancelled", id)
    } else {
        format!(
            "Order {} cannot be cancelled: amount is above the {:.2} limit",
            id, CANCELLATION_LIMIT
        )
    };
    Json(json!({"canCancel": eligible, "message": message})).into_response()
}

/// `GET /health/axiom`
pub async fn axiom_health(State(state): State<AppState>) -> Response {
    let status = state.monitor.status();
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        code,
        Json(json!({"status": status, "healthy": status.is_healthy()})),
    )
        .into_response()
}

/// `GET /stats/cancellations` — default window is the trailing 30 days.
pub async fn cancellation_stats(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Response {
    let (start, end) = match window(&query, 30) {
        Ok(window) => window,
        Err(message) => return bad_request(message),
    };

    match state.logs.compute_statistics(start, end).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to compute cancellation statistics");
            internal_error("Failed to compute statistics")
        }
    }
}

/// `GET /logs/cancellations/successful` — default window 7 days.
pub async fn successful_cancellations(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Response {
    list_cancellations(state, query, true).await
}

/// `GET /logs/cancellations/failed` — symmetric to the successful listing.
pub async fn failed_cancellations(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Response {
    list_cancellations(state, query, false).await
}

async fn list_cancellations(state: AppState, query: WindowQuery, successful: bool) -> Response {
    let (start, end) = match window(&query, 7) {
        Ok(window) => window,
        Err(message) => return bad_request(message),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT);

    let result = if successful {
        state.logs.list_successful(start, end, limit).await
    } else {
        state.logs.list_failed(start, end, limit).await
    };

    match result {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            tracing::error!(error = %e, successful, "Failed to fetch cancellation logs");
            internal_error("Failed to fetch cancellation logs")
        }
    }
}

/// Resolve the query window: explicit bounds win, the end defaults to now,
/// the start defaults to `default_days` before the end.
fn window(query: &WindowQuery, default_days: i64) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let end = match &query.end_date {
        Some(raw) => parse_instant(raw)?,
        None => Utc::now(),
    };
    let start = match &query.start_date {
        Some(raw) => parse_instant(raw)?,
        None => end - Duration::days(default_days),
    };
    Ok((start, end))
}

/// Accepts RFC 3339 timestamps and plain dates (midnight UTC).
fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(format!(
        "'{}' is not an RFC 3339 timestamp or YYYY-MM-DD date",
        raw
    ))
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": message})),
    )
        .into_response()
}
