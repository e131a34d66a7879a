// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ServiceContainer`]: wraps a user [`crate::Service`] with its address,
//! lifecycle state, own cancellable context, cron scheduler, and listener
//! map.

use crate::cron::Cron;
use crate::service::Service;
use chrono::Utc;
use parking_lot::Mutex;
use rt_core::{Address, Event, ServiceError, ServiceInfo};
use rt_session::Session;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Lifecycle state of a service container, parallel to the `failed` flag
/// which any hook error may set regardless of the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Registered,
    Initialized,
    Running,
    Stopped,
}

/// Tracks ticks observed within the current wall-clock second, exposing
/// the previous second's count as `tps` once the second rolls over.
#[derive(Default)]
struct TpsCounter {
    current_second: i64,
    current_count: u32,
    last_tps: u32,
}

impl TpsCounter {
    fn observe_tick(&mut self, at: chrono::DateTime<Utc>) {
        let second = at.timestamp();
        if second == self.current_second {
            self.current_count += 1;
        } else {
            self.last_tps = self.current_count;
            self.current_second = second;
            self.current_count = 1;
        }
    }

    fn tps(&self) -> u32 {
        self.last_tps
    }
}

/// Wraps a registered [`Service`] with the state the engine needs to drive
/// it through init → start → (tick/tock)* → stop, independent of any other
/// service.
pub struct ServiceContainer {
    service: Arc<dyn Service>,
    address: Address,
    state: Mutex<ContainerState>,
    failed: AtomicBool,
    ctx: Mutex<Option<CancellationToken>>,
    cron: Mutex<Option<Cron>>,
    listeners: HashMap<String, Vec<crate::service::Listener>>,
    tps: Mutex<TpsCounter>,
}

impl ServiceContainer {
    pub fn new(service: Arc<dyn Service>, address: Address) -> Self {
        let mut listeners: HashMap<String, Vec<crate::service::Listener>> = HashMap::new();
        for (key, cb) in service.listeners() {
            listeners.entry(key).or_default().push(cb);
        }
        Self {
            service,
            address,
            state: Mutex::new(ContainerState::Registered),
            failed: AtomicBool::new(false),
            ctx: Mutex::new(None),
            cron: Mutex::new(None),
            listeners,
            tps: Mutex::new(TpsCounter::default()),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn name(&self) -> &str {
        self.service.name()
    }

    pub fn service(&self) -> &Arc<dyn Service> {
        &self.service
    }

    pub fn state(&self) -> ContainerState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), ContainerState::Running)
    }

    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn has_tick(&self) -> bool {
        self.service.has_tick()
    }

    pub fn tps(&self) -> u32 {
        self.tps.lock().tps()
    }

    fn mark_failed(&self, session: &Session, err: impl Into<String>) {
        self.failed.store(true, Ordering::SeqCst);
        let err = err.into();
        if let Some(mut info) = session.service_info(&self.address) {
            info.add_err(err);
            session.set_service_info(self.address.clone(), info);
        }
    }

    /// Run init, wiring cron jobs on success. Declared construction-time
    /// errors (e.g. an invalid cron expression surfaced by the service at
    /// registration) fail initialization before `init` is even invoked.
    pub async fn initialize(&self, session: Arc<Session>) -> Result<(), ServiceError> {
        let declared_errors = self.service.declared_errors();
        if !declared_errors.is_empty() {
            let reason = declared_errors.join("; ");
            self.mark_failed(&session, reason.clone());
            return Err(ServiceError::InitFailed {
                name: self.name().to_string(),
                reason,
            });
        }

        if let Err(err) = self.service.init(session.clone()).await {
            self.mark_failed(&session, err.to_string());
            return Err(err);
        }

        let jobs = self.service.cron_jobs();
        if !jobs.is_empty() {
            let mut cron = Cron::new();
            for (expr, callback) in jobs {
                if let Err(reason) = cron.add_job(&expr, callback) {
                    self.mark_failed(&session, reason.clone());
                    return Err(ServiceError::InitFailed {
                        name: self.name().to_string(),
                        reason,
                    });
                }
            }
            *self.cron.lock() = Some(cron);
        }

        *self.state.lock() = ContainerState::Initialized;
        Ok(())
    }

    /// Derive this container's own cancellable context from the engine's
    /// parent context, run `start`, start any cron jobs, mark running, and
    /// emit `services.service.started`.
    pub async fn start(
        &self,
        parent: &CancellationToken,
        session: Arc<Session>,
    ) -> Result<(), ServiceError> {
        let own_ctx = parent.child_token();

        if let Err(err) = self.service.start(session.clone()).await {
            self.mark_failed(&session, err.to_string());
            return Err(err);
        }

        let run_immediately = matches!(
            session.get("app.cron.on.service.start"),
            rt_core::Value::Bool(true)
        );
        if let Some(cron) = self.cron.lock().as_mut() {
            cron.start(session.clone(), run_immediately).await;
        }

        *self.ctx.lock() = Some(own_ctx);
        *self.state.lock() = ContainerState::Running;

        let mut info = session
            .service_info(&self.address)
            .unwrap_or_else(|| ServiceInfo::new(self.name(), self.address.clone()));
        info.started();
        session.set_service_info(self.address.clone(), info);

        session
            .dispatch(
                Event::new("services", "service.started")
                    .with_payload("address", self.address.to_string()),
            )
            .await;
        Ok(())
    }

    /// Stop any cron jobs (waiting for them to drain), cancel this
    /// container's own context with `err` as cause, run `stop`, and emit
    /// `services.service.stopped`.
    pub async fn stop(&self, session: Arc<Session>, err: Option<String>) -> Result<(), ServiceError> {
        if let Some(cron) = self.cron.lock().as_mut() {
            cron.stop().await;
        }
        if let Some(ctx) = self.ctx.lock().take() {
            ctx.cancel();
        }

        let result = self.service.stop(session.clone()).await;

        let mut info = session
            .service_info(&self.address)
            .unwrap_or_else(|| ServiceInfo::new(self.name(), self.address.clone()));
        info.stopped();
        if let Some(err) = &err {
            info.add_err(err.clone());
        }
        session.set_service_info(self.address.clone(), info);

        *self.state.lock() = ContainerState::Stopped;
        if err.is_some() || result.is_err() {
            self.failed.store(true, Ordering::SeqCst);
        }

        session
            .dispatch(
                Event::new("services", "service.stopped")
                    .with_payload("address", self.address.to_string())
                    .with_payload("error", err.unwrap_or_default()),
            )
            .await;
        result
    }

    /// Invoke every listener registered for `event`'s exact `scope.key`
    /// plus those registered on the wildcard `"any"`. Listener errors are
    /// recorded on the service's info and logged, never propagated.
    pub fn handle_event(&self, session: &Session, event: &Event) {
        let key = event.registry_key();
        for (listener_key, callbacks) in &self.listeners {
            if listener_key != &key && listener_key != "any" {
                continue;
            }
            for callback in callbacks {
                if let Err(err) = callback(event) {
                    session.logger().warn(&format!(
                        "listener for '{key}' on service '{}' failed: {err}",
                        self.name()
                    ));
                    if let Some(mut info) = session.service_info(&self.address) {
                        info.add_err(err);
                        session.set_service_info(self.address.clone(), info);
                    }
                }
            }
        }
    }

    /// Feed one tick observation through this container's tps counter.
    pub fn observe_tick(&self, at: chrono::DateTime<Utc>) {
        self.tps.lock().observe_tick(at);
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
