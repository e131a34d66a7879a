// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-scoped logging façade over `tracing`.
//!
//! The runtime logs through `tracing` everywhere. This wraps a
//! `tracing::Span` so every log line emitted through a session carries the
//! session's instance id as a field, the way a long-running daemon threads
//! `worker = worker_name` / `seq = seq` fields through its own
//! `tracing::info!` calls.
#[derive(Clone)]
pub struct SessionLogger {
    span: tracing::Span,
}

impl SessionLogger {
    pub fn new(instance: &str) -> Self {
        Self {
            span: tracing::info_span!("session", instance = %instance),
        }
    }

    pub fn info(&self, msg: &str) {
        let _enter = self.span.enter();
        tracing::info!("{msg}");
    }

    pub fn warn(&self, msg: &str) {
        let _enter = self.span.enter();
        tracing::warn!("{msg}");
    }

    pub fn error(&self, msg: &str) {
        let _enter = self.span.enter();
        tracing::error!("{msg}");
    }

    pub fn debug(&self, msg: &str) {
        let _enter = self.span.enter();
        tracing::debug!("{msg}");
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
