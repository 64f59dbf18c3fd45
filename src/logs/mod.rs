//! Cancellation attempt logging subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation domain (fire-and-forget)
//!     → service.rs (stamp timestamp, serialize)
//!     → LogStore ingest
//!
//! HTTP read surface / quality checker
//!     → service.rs (paged query, outcome filter, statistics)
//!     → LogStore query
//! ```

pub mod records;
pub mod service;

pub use records::{CancellationAttemptRecord, CancellationStatistics};
pub use service::{CancellationLogService, StatsError};
