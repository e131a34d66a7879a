// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Engine`]: the cooperative scheduler that drives the application-level
//! tick/tock loop, owns the service registry, and starts the event
//! dispatcher.

use crate::builtin::StatsService;
use crate::container::ServiceContainer;
use crate::dispatcher;
use crate::service::Service;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use rt_core::{Address, Error, EngineError, Event, Value};
use rt_session::Session;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Future returned by a [`TickFn`]/[`TockFn`] callback.
pub type HookFuture = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send>>;

/// The application-level tick callback: `(session, at, delta)`.
pub type TickFn = Arc<dyn Fn(Arc<Session>, DateTime<Utc>, Duration) -> HookFuture + Send + Sync>;

/// The application-level tock callback: `(session, tick_delta, zero)`.
pub type TockFn = Arc<dyn Fn(Arc<Session>, Duration, Duration) -> HookFuture + Send + Sync>;

const DEFAULT_THROTTLE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    New,
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// The in-process scheduler: registry of services, event dispatcher, and
/// the application tick loop.
pub struct Engine {
    host_address: Address,
    tick: Option<TickFn>,
    tock: Option<TockFn>,
    registry: RwLock<HashMap<Address, Arc<ServiceContainer>>>,
    events: RwLock<HashSet<String>>,
    state: Mutex<EngineState>,
    started_at: Mutex<Option<DateTime<Utc>>>,
    ctx: CancellationToken,
    ev_ctx: CancellationToken,
    tick_task: Mutex<Option<JoinHandle<()>>>,
    dispatcher_task: Mutex<Option<JoinHandle<()>>>,
    service_tick_tasks: Mutex<HashMap<Address, JoinHandle<()>>>,
}

impl Engine {
    pub fn new(host_address: Address) -> Self {
        Self {
            host_address,
            tick: None,
            tock: None,
            registry: RwLock::new(HashMap::new()),
            events: RwLock::new(HashSet::new()),
            state: Mutex::new(EngineState::New),
            started_at: Mutex::new(None),
            ctx: CancellationToken::new(),
            ev_ctx: CancellationToken::new(),
            tick_task: Mutex::new(None),
            dispatcher_task: Mutex::new(None),
            service_tick_tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_tick(mut self, f: TickFn) -> Self {
        self.tick = Some(f);
        self
    }

    pub fn with_tock(mut self, f: TockFn) -> Self {
        self.tock = Some(f);
        self
    }

    pub fn is_running(&self) -> bool {
        *self.state.lock() == EngineState::Running
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        *self.started_at.lock()
    }

    pub fn host_address(&self) -> &Address {
        &self.host_address
    }

    /// Insert `(scope, key)` into the event registry. Fails if already
    /// registered.
    pub fn register_event(&self, scope: &str, key: &str) -> Result<(), EngineError> {
        let registry_key = format!("{scope}.{key}");
        let mut events = self.events.write();
        if !events.insert(registry_key.clone()) {
            return Err(EngineError::DuplicateEvent(registry_key));
        }
        Ok(())
    }

    pub(crate) fn is_event_registered(&self, registry_key: &str) -> bool {
        self.events.read().contains(registry_key)
    }

    /// Register a service under the host's address, rejecting a duplicate
    /// registration at the same derived address.
    pub fn register_service(
        &self,
        session: &Session,
        service: Arc<dyn Service>,
    ) -> Result<Address, EngineError> {
        let address = self.host_address.service(service.name());
        let mut registry = self.registry.write();
        if registry.contains_key(&address) {
            return Err(EngineError::DuplicateService(address.to_string()));
        }
        session.set_service_info(
            address.clone(),
            rt_core::ServiceInfo::new(service.name(), address.clone()),
        );
        registry.insert(
            address.clone(),
            Arc::new(ServiceContainer::new(service, address.clone())),
        );
        Ok(address)
    }

    pub fn container(&self, address: &Address) -> Option<Arc<ServiceContainer>> {
        self.registry.read().get(address).cloned()
    }

    pub fn containers(&self) -> Vec<Arc<ServiceContainer>> {
        self.registry.read().values().cloned().collect()
    }

    fn throttle(&self, session: &Session) -> Duration {
        match session.get("app.engine.throttle_ticks") {
            Value::Int(ms) if ms > 0 => Duration::from_millis(ms as u64),
            _ => DEFAULT_THROTTLE,
        }
    }

    /// Start the engine: validate the tick/tock invariant, optionally wire
    /// the built-in stats service, launch the application tick loop,
    /// initialize every registered service concurrently, start the event
    /// dispatcher, then dispatch one `services.start.services` event
    /// listing every autostart service.
    pub async fn start(self: &Arc<Self>, session: Arc<Session>) -> Result<(), Error> {
        {
            let mut state = self.state.lock();
            if *state != EngineState::New {
                return Err(EngineError::AlreadyRunning.into());
            }
            if self.tock.is_some() && self.tick.is_none() {
                return Err(EngineError::TockWithoutTick.into());
            }
            *state = EngineState::Starting;
        }
        *self.started_at.lock() = Some(Utc::now());

        let want_stats = !matches!(
            session.get("app.engine.stats_service"),
            Value::Bool(false)
        );
        if want_stats {
            let _ = self.register_service(&session, Arc::new(StatsService::new()));
        }

        let tick_handle = tokio::spawn(tick_loop(self.clone(), session.clone()));
        *self.tick_task.lock() = Some(tick_handle);

        let containers = self.containers();
        let init_results = join_all(containers.iter().map(|c| {
            let session = session.clone();
            let container = c.clone();
            async move { container.initialize(session).await }
        }))
        .await;
        for result in init_results {
            if let Err(err) = result {
                warn!(error = %err, "service initialization failed, destroying session");
                session.destroy(Some(err.to_string()));
                *self.state.lock() = EngineState::Stopped;
                return Err(EngineError::InitFailed(err.to_string()).into());
            }
        }

        let Some(event_rx) = session.take_event_receiver() else {
            return Err(EngineError::InitFailed("event receiver already taken".into()).into());
        };
        let dispatcher_handle = tokio::spawn(dispatcher::run(
            self.clone(),
            session.clone(),
            event_rx,
            self.ev_ctx.clone(),
        ));
        *self.dispatcher_task.lock() = Some(dispatcher_handle);

        *self.state.lock() = EngineState::Running;

        let autostart: Vec<Value> = containers
            .iter()
            .filter(|c| c.service().autostart())
            .map(|c| Value::String(c.address().to_string()))
            .collect();
        if !autostart.is_empty() {
            session
                .dispatch(
                    Event::new("services", "start.services").with_payload("addresses", autostart),
                )
                .await;
        }

        info!(instance = session.instance(), "engine started");
        Ok(())
    }

    /// Start a registered, not-already-running, not-failed service and, if
    /// it declares a tick action, spawn its per-service tick/tock loop.
    pub async fn service_start(self: &Arc<Self>, session: Arc<Session>, addr: &Address) {
        let Some(container) = self.container(addr) else {
            debug!(%addr, "serviceStart: no such service");
            return;
        };
        if container.is_failed() || container.is_running() {
            debug!(%addr, "serviceStart: already running or failed");
            return;
        }
        if let Err(err) = container.start(&self.ctx, session.clone()).await {
            warn!(%addr, error = %err, "service start failed");
            return;
        }
        if container.has_tick() {
            let engine = self.clone();
            let session = session.clone();
            let addr = addr.clone();
            let handle = tokio::spawn(async move {
                engine.service_tick_loop(session, addr).await;
            });
            self.service_tick_tasks.lock().insert(addr.clone(), handle);
        }
    }

    async fn service_tick_loop(self: Arc<Self>, session: Arc<Session>, addr: Address) {
        let Some(container) = self.container(&addr) else {
            return;
        };
        let mut last = Utc::now();
        loop {
            let throttle = self.throttle(&session);
            tokio::select! {
                _ = self.ctx.cancelled() => return,
                _ = tokio::time::sleep(throttle) => {}
            }
            let now = Utc::now();
            let delta = (now - last)
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(0));
            last = now;
            container.observe_tick(now);

            let tick_result = container.service().tick(session.clone(), now, delta).await;
            match tick_result {
                Ok(()) => {
                    let tock_start = Utc::now();
                    if let Err(err) = container.service().tock(session.clone(), delta).await {
                        warn!(%addr, error = %err, "service tock failed");
                        self.service_stop(session.clone(), &addr, Some(err.to_string()))
                            .await;
                        return;
                    }
                    let _ = tock_start;
                }
                Err(err) => {
                    warn!(%addr, error = %err, "service tick failed");
                    self.service_stop(session.clone(), &addr, Some(err.to_string()))
                        .await;
                    return;
                }
            }
        }
    }

    /// Stop a single service.
    pub async fn service_stop(self: &Arc<Self>, session: Arc<Session>, addr: &Address, err: Option<String>) {
        let Some(container) = self.container(addr) else {
            debug!(%addr, "serviceStop: no such service");
            return;
        };
        if let Err(stop_err) = container.stop(session, err).await {
            warn!(%addr, error = %stop_err, "service stop returned an error");
        }
    }

    /// Orderly full-engine shutdown: cancel the engine context (letting
    /// tick loops observe and exit), wait, stop every still-running
    /// service concurrently, then only cancel the event context once the
    /// resulting `service.stopped` events are queued. The dispatcher is
    /// stopped last so it has a chance to drain the events service
    /// shutdown itself produces.
    pub async fn stop(self: &Arc<Self>, session: Arc<Session>) {
        {
            let mut state = self.state.lock();
            if *state != EngineState::Running {
                return;
            }
            *state = EngineState::Stopping;
        }

        self.ctx.cancel();
        if let Some(handle) = self.tick_task.lock().take() {
            let _ = handle.await;
        }

        let pending_tick_tasks: Vec<JoinHandle<()>> =
            self.service_tick_tasks.lock().drain().map(|(_, h)| h).collect();
        for handle in pending_tick_tasks {
            let _ = handle.await;
        }

        let running: Vec<Arc<ServiceContainer>> = self
            .containers()
            .into_iter()
            .filter(|c| c.is_running())
            .collect();
        join_all(running.iter().map(|c| {
            let session = session.clone();
            let addr = c.address().clone();
            let engine = self.clone();
            async move { engine.service_stop(session, &addr, None).await }
        }))
        .await;

        self.ev_ctx.cancel();
        if let Some(handle) = self.dispatcher_task.lock().take() {
            let _ = handle.await;
        }

        *self.state.lock() = EngineState::Stopped;
        session.mark_done();
        info!("engine stopped");
    }
}

async fn tick_loop(engine: Arc<Engine>, session: Arc<Session>) {
    let mut ready_fired = engine.tick.is_none() && engine.tock.is_none();
    if ready_fired {
        session.mark_ready();
    }
    let mut last_tick = Utc::now();
    loop {
        let throttle = engine.throttle(&session);
        tokio::select! {
            _ = engine.ctx.cancelled() => return,
            _ = tokio::time::sleep(throttle) => {}
        }
        let now = Utc::now();
        let delta = (now - last_tick)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(0));
        last_tick = now;

        let Some(tick_fn) = &engine.tick else {
            if !ready_fired {
                session.mark_ready();
                ready_fired = true;
            }
            continue;
        };

        match tick_fn(session.clone(), now, delta).await {
            Ok(()) => {
                if !ready_fired {
                    session.mark_ready();
                    ready_fired = true;
                }
                if let Some(tock_fn) = &engine.tock {
                    let tick_delta = (Utc::now() - now)
                        .to_std()
                        .unwrap_or(std::time::Duration::from_secs(0));
                    if let Err(err) = tock_fn(session.clone(), tick_delta, Duration::ZERO).await {
                        session
                            .dispatch(
                                Event::new("engine", "app.tock.err").with_error(err.to_string()),
                            )
                            .await;
                        return;
                    }
                }
            }
            Err(err) => {
                // Ready means boot has completed, not that the first tick
                // succeeded; a command blocked on `session.ready()` must
                // still be able to run (and stop the engine) after a tick
                // error on the very first iteration.
                if !ready_fired {
                    session.mark_ready();
                }
                session
                    .dispatch(Event::new("engine", "app.tick.err").with_error(err.to_string()))
                    .await;
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
