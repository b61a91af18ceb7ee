//! Logging port.
//!
//! DESIGN
//! ======
//! Core components report through [`LogSink`] rather than calling `tracing`
//! directly, so tests can assert on what was logged. The production sink,
//! [`TracingSink`], forwards every record as a structured `tracing` event with
//! `component` and `payload` fields; the binary decides where those go.

#[cfg(test)]
#[path = "logging_test.rs"]
mod logging_test;

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::Level;

/// Structured log sink: `log(level, component, message, payload)`.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, component: &str, message: &str, payload: &Value);
}

/// Forwards records to the global `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, component: &str, message: &str, payload: &Value) {
        match level {
            Level::ERROR => tracing::error!(component, %payload, "{message}"),
            Level::WARN => tracing::warn!(component, %payload, "{message}"),
            Level::INFO => tracing::info!(component, %payload, "{message}"),
            Level::DEBUG => tracing::debug!(component, %payload, "{message}"),
            Level::TRACE => tracing::trace!(component, %payload, "{message}"),
        }
    }
}

/// One captured log call.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub component: String,
    pub message: String,
    pub payload: Value,
}

/// Records every call in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything logged so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Records at exactly `level`.
    #[must_use]
    pub fn at_level(&self, level: Level) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }

    /// Records at warn level.
    #[must_use]
    pub fn warnings(&self) -> Vec<LogRecord> {
        self.at_level(Level::WARN)
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, component: &str, message: &str, payload: &Value) {
        let record = LogRecord {
            level,
            component: component.to_string(),
            message: message.to_string(),
            payload: payload.clone(),
        };
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}

/// Shared handle to a sink, as held by the store and coordinator.
pub type SharedSink = Arc<dyn LogSink>;

/// Install a `tracing_subscriber` fmt layer filtered by `RUST_LOG`
/// (default `info`). Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
