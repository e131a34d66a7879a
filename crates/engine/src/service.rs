// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Service` trait: a long-running component with
//! init/start/stop/tick hooks, registered once with the engine and wrapped
//! by a [`crate::container::ServiceContainer`] for the rest of its life.

use crate::cron::CronJob;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rt_core::ServiceError;
use rt_session::Session;
use std::sync::Arc;
use std::time::Duration;

/// A listener invoked by a service container's `handle_event` for every
/// event matching its registered scope.key (or the wildcard `"any"`).
/// Errors are recorded on the service's info but never propagated.
pub type Listener = Arc<dyn Fn(&rt_core::Event) -> Result<(), String> + Send + Sync>;

/// A component the engine drives through init → start → (tick/tock)* → stop.
///
/// All hooks default to no-ops so an implementer only overrides what it
/// needs; `has_tick` governs whether the engine spawns a per-service tick
/// loop for this service at all.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn init(&self, _session: Arc<Session>) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn start(&self, _session: Arc<Session>) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn stop(&self, _session: Arc<Session>) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn tick(
        &self,
        _session: Arc<Session>,
        _at: DateTime<Utc>,
        _delta: Duration,
    ) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn tock(&self, _session: Arc<Session>, _delta: Duration) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Whether the engine should spawn a per-service tick/tock loop after
    /// `start` succeeds.
    fn has_tick(&self) -> bool {
        false
    }

    /// Whether the engine should start this service automatically once it
    /// has initialized, rather than waiting for an explicit
    /// `services.start.services` request via [`rt_session::ServiceLoader`].
    fn autostart(&self) -> bool {
        true
    }

    /// Cron expressions this service wants scheduled, paired with the
    /// closure invoked on each firing. Empty by default.
    fn cron_jobs(&self) -> Vec<(String, CronJob)> {
        Vec::new()
    }

    /// Event listeners this service wants registered at construction time,
    /// keyed by `scope.key` (or `"any"` for every dispatched event).
    fn listeners(&self) -> Vec<(String, Listener)> {
        Vec::new()
    }

    /// Errors accumulated while the service was being built (e.g. an
    /// invalid cron expression discovered at registration time, before the
    /// engine ever calls `init`). A non-empty list fails initialization
    /// before `init` is invoked.
    fn declared_errors(&self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
