//! Health monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! Interval timer (monitor.rs):
//!     → Probe the log store's dataset
//!     → Compare with stored status
//!     → On change: swap status, publish events on the broadcast channel
//!
//! State machine:
//!     Unknown → {Healthy, Unhealthy} → Healthy ↔ Unhealthy
//! ```
//!
//! # Design Decisions
//! - Status lives in an AtomicU8 so reads never block or do I/O
//! - Subscribers get at most one Changed event per transition
//! - The monitor never raises; probe failures read as Unhealthy

pub mod monitor;

pub use monitor::{HealthEvent, HealthMonitor, HealthStatus};
