//! Order-cancellation service with Axiom-backed attempt logging.
//!
//! # Architecture Overview
//!
//! ```text
//! POST /cancel ──▶ http ──▶ orders (threshold + fee decision)
//!                              │
//!                              │ fire-and-forget
//!                              ▼
//!                      logs (stamp, serialize) ──▶ axiom client ──▶ Axiom
//!                              ▲
//! GET /logs, /stats ───────────┘  (paged query, outcome filter, statistics)
//!
//! health  ── interval probe ──▶ axiom client; transitions on a broadcast
//! quality ── interval probe ──▶ public HTTP surface + logs service
//! ```
//!
//! Logging is best-effort by design: ingest failures degrade to a counted
//! "failed to ingest" and never affect a cancellation response. Query
//! failures DO surface, because the read endpoints must distinguish empty
//! results from a broken backend.

// Core subsystems
pub mod axiom;
pub mod config;
pub mod http;
pub mod logs;
pub mod orders;

// Monitoring
pub mod health;
pub mod quality;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
