//! Data provider port.
//!
//! A provider turns a widget config into a payload. The dashboard calls it
//! between `start_fetch` and `finish_fetch`; its error message is what the
//! error boundary classifies, so providers should say "timeout" or "network"
//! when that is what happened.

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::consts::DEFAULT_RETRY_PATTERNS;
use crate::error::ErrorCode;
use crate::widget::{WidgetConfig, WidgetData};

#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn fetch(&self, config: &WidgetConfig) -> Result<WidgetData, FetchError>;
}

/// A failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl ErrorCode for FetchError {
    fn error_code(&self) -> &'static str {
        "E_FETCH"
    }

    /// Matches the message against the built-in transient patterns only.
    /// Auto-retry decisions go through the configured
    /// [`RetryPolicy`](crate::boundary::RetryPolicy) instead, so with
    /// `DASHBOARD_RETRY_PATTERNS` overridden the two can disagree.
    fn retryable(&self) -> bool {
        let lower = self.message.to_lowercase();
        DEFAULT_RETRY_PATTERNS.iter().any(|p| lower.contains(p))
    }
}

/// Always returns the same payload.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    data: WidgetData,
}

impl StaticProvider {
    #[must_use]
    pub fn new(data: WidgetData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl DataProvider for StaticProvider {
    async fn fetch(&self, _config: &WidgetConfig) -> Result<WidgetData, FetchError> {
        Ok(self.data.clone())
    }
}

/// Fails a fixed number of times with `message`, then returns `data`.
#[derive(Debug)]
pub struct FlakyProvider {
    failures_left: AtomicU32,
    calls: AtomicU32,
    message: String,
    data: WidgetData,
}

impl FlakyProvider {
    #[must_use]
    pub fn new(failures: u32, message: impl Into<String>, data: WidgetData) -> Self {
        Self {
            failures_left: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
            message: message.into(),
            data,
        }
    }

    /// Number of `fetch` calls so far.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for FlakyProvider {
    async fn fetch(&self, _config: &WidgetConfig) -> Result<WidgetData, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failed = self.failures_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok();
        if failed {
            Err(FetchError::new(self.message.clone()))
        } else {
            Ok(self.data.clone())
        }
    }
}
