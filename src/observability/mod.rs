//! Observability subsystem.
//!
//! # Responsibilities
//! - Prometheus metrics exporter and recording helpers
//!
//! Structured logging itself is initialized in `main` via
//! `tracing-subscriber`; subsystems emit `tracing` events directly.

pub mod metrics;
