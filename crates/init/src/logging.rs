// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging bootstrap: a [`QueuedLogger`] buffers records emitted before
//! paths/profile are resolved and the real `tracing` subscriber is
//! installed, then [`QueuedLogger::drain`] replays them once [`install`]
//! has wired a `tracing-subscriber` `fmt` layer over a reloadable
//! `EnvFilter`, with a `reload::Handle` so `--system-debug`/`--debug`/
//! `--verbose` can raise the level without restarting the process.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Severity of a buffered pre-subscriber record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuedLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One log line captured before the real subscriber existed.
#[derive(Debug, Clone)]
pub struct QueuedRecord {
    pub level: QueuedLevel,
    pub target: String,
    pub message: String,
}

/// Buffers log records during the pre-logger boot phases; replayed into
/// the real subscriber once it is installed.
#[derive(Clone, Default)]
pub struct QueuedLogger {
    records: Arc<Mutex<Vec<QueuedRecord>>>,
}

impl QueuedLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: QueuedLevel, target: &str, message: impl Into<String>) {
        self.records.lock().push(QueuedRecord {
            level,
            target: target.to_string(),
            message: message.into(),
        });
    }

    pub fn debug(&self, target: &str, message: impl Into<String>) {
        self.push(QueuedLevel::Debug, target, message);
    }

    pub fn info(&self, target: &str, message: impl Into<String>) {
        self.push(QueuedLevel::Info, target, message);
    }

    pub fn warn(&self, target: &str, message: impl Into<String>) {
        self.push(QueuedLevel::Warn, target, message);
    }

    pub fn error(&self, target: &str, message: impl Into<String>) {
        self.push(QueuedLevel::Error, target, message);
    }

    /// Drain every buffered record in insertion order, leaving the queue
    /// empty. Call after the real subscriber is installed.
    pub fn drain(&self) -> Vec<QueuedRecord> {
        std::mem::take(&mut self.records.lock())
    }
}

/// Replay queued records into the live `tracing` subscriber.
pub fn replay(queued: &QueuedLogger) {
    for record in queued.drain() {
        match record.level {
            QueuedLevel::Debug => tracing::debug!(target: "rt::boot", queued_target = %record.target, "{}", record.message),
            QueuedLevel::Info => tracing::info!(target: "rt::boot", queued_target = %record.target, "{}", record.message),
            QueuedLevel::Warn => tracing::warn!(target: "rt::boot", queued_target = %record.target, "{}", record.message),
            QueuedLevel::Error => tracing::error!(target: "rt::boot", queued_target = %record.target, "{}", record.message),
        }
    }
}

/// Handle onto the live filter, letting the initializer raise the log
/// level in response to `--system-debug`/`--debug`/`--verbose` without
/// re-installing the subscriber.
pub struct LoggingHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LoggingHandle {
    pub fn set_level(&self, directive: &str) -> Result<(), String> {
        let filter = EnvFilter::try_new(directive).map_err(|e| e.to_string())?;
        self.handle.reload(filter).map_err(|e| e.to_string())
    }
}

/// Install the process-wide subscriber: an `EnvFilter` (default
/// `default_level`, overridable via `RUST_LOG`) feeding a `fmt` layer.
pub fn install(default_level: &str) -> LoggingHandle {
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (filter_layer, handle) = reload::Layer::new(filter);
    // `try_init` rather than `init`: a process that bootstraps more than
    // once (every integration test in this workspace does) must not panic
    // on the second global-subscriber install; the first installation wins
    // and later handles are simply inert.
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer())
        .try_init();
    LoggingHandle { handle }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
