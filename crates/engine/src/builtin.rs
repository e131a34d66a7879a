// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The built-in stats service, optionally registered by the engine on
//! start. Ticks once per engine throttle interval and publishes
//! running counters through the session's API registry under `"stats"`,
//! and counts every dispatched event via a wildcard listener.

use crate::service::{Listener, Service};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rt_core::{Event, ServiceError};
use rt_session::Session;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared counters published under the `"stats"` API name.
#[derive(Default)]
pub struct Stats {
    pub ticks_observed: AtomicU64,
    pub events_dispatched: AtomicU64,
    pub services_running: AtomicU64,
}

impl Stats {
    pub fn snapshot(&self) -> (u64, u64, u64) {
        (
            self.ticks_observed.load(Ordering::SeqCst),
            self.events_dispatched.load(Ordering::SeqCst),
            self.services_running.load(Ordering::SeqCst),
        )
    }
}

/// Always-on internal metrics service: a tick-driven counter surface with
/// no user-facing configuration.
pub struct StatsService {
    stats: Arc<Stats>,
}

impl StatsService {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Stats::default()),
        }
    }

    pub fn stats(&self) -> Arc<Stats> {
        self.stats.clone()
    }
}

impl Default for StatsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for StatsService {
    fn name(&self) -> &str {
        "stats"
    }

    async fn init(&self, session: Arc<Session>) -> Result<(), ServiceError> {
        session.apis().register("stats", self.stats.clone());
        Ok(())
    }

    async fn tick(
        &self,
        session: Arc<Session>,
        _at: DateTime<Utc>,
        _delta: Duration,
    ) -> Result<(), ServiceError> {
        self.stats.ticks_observed.fetch_add(1, Ordering::SeqCst);
        let running = session
            .service_infos()
            .values()
            .filter(|info| info.running)
            .count() as u64;
        self.stats.services_running.store(running, Ordering::SeqCst);
        Ok(())
    }

    fn has_tick(&self) -> bool {
        true
    }

    fn listeners(&self) -> Vec<(String, Listener)> {
        let stats = self.stats.clone();
        vec![(
            "any".to_string(),
            Arc::new(move |_event: &Event| {
                stats.events_dispatched.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )]
    }
}

#[cfg(test)]
#[path = "builtin_tests.rs"]
mod tests;
