//! Configuration loading from the environment.
//!
//! # Responsibilities
//! - Map environment variables onto the config schema
//! - Semantic validation (required values present, region valid, URL parses)
//! - Collect every violation before failing, not just the first
//!
//! Startup fails fast on any violation; in particular there is no fallback
//! API token.

use std::str::FromStr;

use crate::config::schema::{AppConfig, AxiomRegion};

/// A single configuration violation, tied to the variable that caused it.
#[derive(Debug)]
pub struct ConfigViolation {
    pub var: &'static str,
    pub problem: String,
}

impl std::fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.var, self.problem)
    }
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Invalid(Vec<ConfigViolation>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(violations) => {
                write!(f, "invalid configuration: ")?;
                for (i, v) in violations.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Exists so validation can be exercised without mutating the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();
        let mut violations = Vec::new();

        match lookup("AXIOM_TOKEN").map(|v| v.trim().to_string()) {
            Some(token) if !token.is_empty() => config.axiom.token = token,
            _ => violations.push(ConfigViolation {
                var: "AXIOM_TOKEN",
                problem: "required and must be non-empty".to_string(),
            }),
        }

        match lookup("AXIOM_DATASET").map(|v| v.trim().to_string()) {
            Some(dataset) if !dataset.is_empty() => config.axiom.dataset = dataset,
            _ => violations.push(ConfigViolation {
                var: "AXIOM_DATASET",
                problem: "required and must be non-empty".to_string(),
            }),
        }

        if let Some(region) = lookup("AXIOM_REGION") {
            match region.parse::<AxiomRegion>() {
                Ok(region) => config.axiom.region = region,
                Err(problem) => violations.push(ConfigViolation {
                    var: "AXIOM_REGION",
                    problem,
                }),
            }
        }

        if let Some(url) = lookup("AXIOM_URL") {
            match url::Url::parse(&url) {
                Ok(_) => config.axiom.url = Some(url),
                Err(e) => violations.push(ConfigViolation {
                    var: "AXIOM_URL",
                    problem: format!("not a valid URL: {}", e),
                }),
            }
        }

        if let Some(addr) = lookup("BIND_ADDRESS") {
            config.server.bind_address = addr;
        }

        config.server.request_timeout_secs = parse_var(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            config.server.request_timeout_secs,
            &mut violations,
        );
        config.axiom.timeout_secs = parse_var(
            &lookup,
            "AXIOM_TIMEOUT_SECS",
            config.axiom.timeout_secs,
            &mut violations,
        );
        config.health_check.interval_secs = parse_var(
            &lookup,
            "HEALTH_CHECK_INTERVAL_SECS",
            config.health_check.interval_secs,
            &mut violations,
        );
        config.quality_check.enabled = parse_var(
            &lookup,
            "QUALITY_CHECK_ENABLED",
            config.quality_check.enabled,
            &mut violations,
        );
        config.quality_check.interval_secs = parse_var(
            &lookup,
            "QUALITY_CHECK_INTERVAL_SECS",
            config.quality_check.interval_secs,
            &mut violations,
        );
        if let Some(base_url) = lookup("QUALITY_CHECK_BASE_URL") {
            match url::Url::parse(&base_url) {
                Ok(_) => config.quality_check.base_url = base_url.trim_end_matches('/').to_string(),
                Err(e) => violations.push(ConfigViolation {
                    var: "QUALITY_CHECK_BASE_URL",
                    problem: format!("not a valid URL: {}", e),
                }),
            }
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.observability.log_level = level;
        }
        config.observability.metrics_enabled = parse_var(
            &lookup,
            "METRICS_ENABLED",
            config.observability.metrics_enabled,
            &mut violations,
        );
        if let Some(addr) = lookup("METRICS_ADDRESS") {
            config.observability.metrics_address = addr;
        }

        if violations.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(violations))
        }
    }
}

/// Parse an optional variable, falling back to the default when unset and
/// recording a violation when set but unparseable.
fn parse_var<F, T>(
    lookup: &F,
    var: &'static str,
    default: T,
    violations: &mut Vec<ConfigViolation>,
) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                violations.push(ConfigViolation {
                    var,
                    problem: format!("'{}' is invalid: {}", raw, e),
                });
                default
            }
        },
        None => default,
    }
}
