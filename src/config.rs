//! Runtime tuning loaded from environment variables.
//!
//! Every knob has a `DEFAULT_*` constant; a missing or unparsable variable
//! silently falls back to it.
//!
//! - `DASHBOARD_MAX_RETRIES`: automatic retries per fault streak (default 3)
//! - `DASHBOARD_RETRY_BASE_MS`: backoff base in milliseconds (default 1000)
//! - `DASHBOARD_RETRY_PATTERNS`: comma-separated transient-message fragments
//! - `DASHBOARD_DEFAULT_ESTIMATED_HOURS`: hours on a freshly created milestone (default 10)

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::consts::{DEFAULT_ESTIMATED_HOURS, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_MS, DEFAULT_RETRY_PATTERNS};

/// Tuning knobs for the dashboard coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub max_retries: u32,
    pub retry_base: Duration,
    pub retry_patterns: Vec<String>,
    pub default_estimated_hours: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
            retry_patterns: DEFAULT_RETRY_PATTERNS.iter().map(ToString::to_string).collect(),
            default_estimated_hours: DEFAULT_ESTIMATED_HOURS,
        }
    }
}

impl DashboardConfig {
    /// Build config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let retry_patterns = match std::env::var("DASHBOARD_RETRY_PATTERNS") {
            Ok(raw) if !parse_patterns(&raw).is_empty() => parse_patterns(&raw),
            _ => DEFAULT_RETRY_PATTERNS.iter().map(ToString::to_string).collect(),
        };

        let default_estimated_hours = env_parse("DASHBOARD_DEFAULT_ESTIMATED_HOURS", DEFAULT_ESTIMATED_HOURS);

        Self {
            max_retries: env_parse("DASHBOARD_MAX_RETRIES", DEFAULT_MAX_RETRIES),
            retry_base: Duration::from_millis(env_parse("DASHBOARD_RETRY_BASE_MS", DEFAULT_RETRY_BASE_MS)),
            retry_patterns,
            default_estimated_hours: if default_estimated_hours.is_finite() && default_estimated_hours >= 0.0 {
                default_estimated_hours
            } else {
                DEFAULT_ESTIMATED_HOURS
            },
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(v) => v.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}
