//! Cancellation domain logic.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → service.rs (threshold + fee decision)
//!     → response to the caller, immediately
//!     → detached task → log service ingest (never awaited)
//! ```

pub mod service;
pub mod types;

pub use service::{can_cancel_order, CancellationService, CANCELLATION_FEE_RATE, CANCELLATION_LIMIT};
pub use types::{CancellationResponse, Order, OrderStatus, RequestMeta};
