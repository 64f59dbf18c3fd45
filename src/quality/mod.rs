//! End-to-end quality checking subsystem.
//!
//! # Data Flow
//! ```text
//! Interval timer (checker.rs):
//!     → GET /health/axiom (public surface)
//!     → POST /cancel, below and above the threshold
//!     → Log service: most recent success record, field validation
//!     → Log service: 7-day statistics, consistency check
//!     → structured pass/fail log + counter
//! ```
//!
//! # Design Decisions
//! - Runs on its own timer, independent of the health monitor
//! - First failing step aborts the cycle; the scheduler keeps running
//! - Probes the real HTTP surface so routing and serialization are covered

pub mod checker;

pub use checker::{CycleError, QualityChecker};
