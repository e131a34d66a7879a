// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-service status record, readable via the session's service-info registry.

use crate::address::Address;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Status of a single service: created at registration, updated by the
/// owning container as the service starts, stops, or errors.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub address: Address,
    pub running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    errors: BTreeMap<DateTime<Utc>, String>,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            running: false,
            started_at: None,
            stopped_at: None,
            errors: BTreeMap::new(),
        }
    }

    /// Mark the service started: sets `running` and records `started_at`.
    pub fn started(&mut self) {
        self.running = true;
        self.started_at = Some(Utc::now());
    }

    /// Mark the service stopped: clears `running` and records `stopped_at`.
    pub fn stopped(&mut self) {
        self.running = false;
        self.stopped_at = Some(Utc::now());
    }

    /// Append an error. Errors are never cleared; this is an append-only log.
    pub fn add_err(&mut self, err: impl Into<String>) {
        self.errors.insert(Utc::now(), err.into());
    }

    pub fn errors(&self) -> impl Iterator<Item = (&DateTime<Utc>, &String)> {
        self.errors.iter()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
#[path = "service_info_tests.rs"]
mod tests;
