//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits; values are sourced from the environment by
//! the loader.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration for the cancellation service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration (bind address, request timeout).
    pub server: ServerConfig,

    /// Axiom log store connection settings.
    pub axiom: AxiomConfig,

    /// Log store health check settings.
    pub health_check: HealthCheckConfig,

    /// End-to-end quality checker settings.
    pub quality_check: QualityCheckConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Axiom API region. Selects the ingest/query endpoint the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxiomRegion {
    Us,
    Eu,
}

impl AxiomRegion {
    /// Base URL of the Axiom API for this region.
    pub fn base_url(&self) -> &'static str {
        match self {
            AxiomRegion::Us => "https://api.axiom.co",
            AxiomRegion::Eu => "https://api.eu.axiom.co",
        }
    }
}

impl FromStr for AxiomRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(AxiomRegion::Us),
            "eu" => Ok(AxiomRegion::Eu),
            other => Err(format!("unknown region '{}', expected 'us' or 'eu'", other)),
        }
    }
}

impl fmt::Display for AxiomRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxiomRegion::Us => write!(f, "us"),
            AxiomRegion::Eu => write!(f, "eu"),
        }
    }
}

/// Axiom log store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AxiomConfig {
    /// API token (Bearer auth). Required; there is no fallback value.
    pub token: String,

    /// Dataset that receives cancellation attempt records. Required.
    pub dataset: String,

    /// API region.
    pub region: AxiomRegion,

    /// Explicit API base URL. Overrides the region endpoint when set
    /// (self-hosted deployments and tests).
    pub url: Option<String>,

    /// Request timeout in seconds for ingest/query/health calls.
    pub timeout_secs: u64,
}

impl Default for AxiomConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            dataset: String::new(),
            region: AxiomRegion::Us,
            url: None,
            timeout_secs: 10,
        }
    }
}

impl AxiomConfig {
    /// Resolved API base URL: explicit override, else the region endpoint.
    pub fn api_url(&self) -> String {
        match &self.url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.region.base_url().to_string(),
        }
    }
}

/// Log store health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the background health monitor.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

/// End-to-end quality checker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QualityCheckConfig {
    /// Enable the periodic quality checker.
    pub enabled: bool,

    /// Quality check interval in seconds. Independent of the health
    /// monitor's schedule.
    pub interval_secs: u64,

    /// Base URL of the HTTP surface the checker probes.
    pub base_url: String,
}

impl Default for QualityCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
