//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → loader.rs (lookup, parse, collect violations)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc/clone to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults except the Axiom token and dataset, which are
//!   required and fail startup when absent
//! - The loader reports every violation at once, not just the first

pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigViolation};
pub use schema::{
    AppConfig, AxiomConfig, AxiomRegion, HealthCheckConfig, ObservabilityConfig,
    QualityCheckConfig, ServerConfig,
};
