// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Session::service_loader`: a one-shot coordinator that waits until a set
//! of services have started, polling the session's service-info map
//! at a configurable interval (`app.service_loader.poll_interval`, in
//! milliseconds, default 100) up to a configurable timeout
//! (`app.service_loader.timeout`, in milliseconds, default 30000).

use crate::session::Session;
use rt_core::{Address, Event, SessionError, Value};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Waits for a set of addresses to report as running in the session's
/// service-info map, or for the loader's timeout to elapse.
pub struct ServiceLoader<'a> {
    session: &'a Session,
    addresses: Vec<Address>,
    timeout: Duration,
    poll_interval: Duration,
}

impl<'a> ServiceLoader<'a> {
    pub fn new(session: &'a Session, addresses: Vec<Address>) -> Self {
        let timeout = match session.get("app.service_loader.timeout") {
            rt_core::Value::Int(ms) if ms > 0 => Duration::from_millis(ms as u64),
            _ => DEFAULT_TIMEOUT,
        };
        let poll_interval = match session.get("app.service_loader.poll_interval") {
            rt_core::Value::Int(ms) if ms > 0 => Duration::from_millis(ms as u64),
            _ => DEFAULT_POLL_INTERVAL,
        };
        Self {
            session,
            addresses,
            timeout,
            poll_interval,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn not_yet_running(&self) -> Result<Vec<String>, SessionError> {
        let mut pending = Vec::new();
        for address in &self.addresses {
            match self.session.service_info(address) {
                None => pending.push(address.to_string()),
                Some(info) => {
                    if info.has_errors() {
                        return Err(SessionError::LoaderServiceFailed(address.to_string()));
                    }
                    if !info.running {
                        pending.push(address.to_string());
                    }
                }
            }
        }
        Ok(pending)
    }

    /// Emit one `services.start.services` event listing whichever targets
    /// are not yet running, then poll until every address is running, a
    /// watched service reports an error, or the timeout elapses.
    pub async fn wait(self) -> Result<(), SessionError> {
        let deadline = tokio::time::Instant::now() + self.timeout;

        let initial_pending = self.not_yet_running()?;
        if initial_pending.is_empty() {
            return Ok(());
        }
        let payload = initial_pending
            .iter()
            .cloned()
            .map(Value::String)
            .collect();
        self.session
            .dispatch(
                Event::new("services", "start.services")
                    .with_payload("addresses", Value::List(payload)),
            )
            .await;

        loop {
            let pending = self.not_yet_running()?;
            if pending.is_empty() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SessionError::LoaderTimeout(pending));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
#[path = "service_loader_tests.rs"]
mod tests;
