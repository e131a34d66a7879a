// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process-wide [`Session`]: the context threaded through
//! every command invocation, service, and addon callback for the lifetime
//! of one process run. Created once by the Initializer; destroyed exactly
//! once, whether by clean shutdown, signal, or a fatal error.

use crate::api::ApiRegistry;
use crate::gate::Gate;
use crate::profile::Profile;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use rt_core::{Address, Error, Event, ServiceInfo, SessionError};
use rt_options::OptionsStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::logger::SessionLogger;

/// Capacity of the session's event-dispatch channel. Overridable via
/// `app.session.event_channel_capacity` (SPEC_FULL ambient stack).
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct Session {
    instance: String,
    logger: SessionLogger,
    profile: Profile,
    options: RwLock<OptionsStore>,
    apis: ApiRegistry,

    ready_gate: Gate,
    done_gate: Gate,
    closed_gate: Gate,
    user_closed_gate: Gate,

    /// Cancelled on a graceful terminate request (signal, `Destroy`, engine stop).
    terminate_context: CancellationToken,
    /// Cancelled on a forceful kill (second signal, hard deadline exceeded).
    kill_context: CancellationToken,

    event_tx: mpsc::Sender<Event>,
    event_rx: Mutex<Option<mpsc::Receiver<Event>>>,

    service_infos: RwLock<HashMap<Address, ServiceInfo>>,

    allow_user_cancel: AtomicBool,
    terminated: AtomicBool,
    disposed: AtomicBool,
    valid: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl Session {
    pub fn new(instance: impl Into<String>, options: OptionsStore) -> Self {
        Self::with_event_capacity(instance, options, DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_event_capacity(
        instance: impl Into<String>,
        options: OptionsStore,
        event_channel_capacity: usize,
    ) -> Self {
        let instance = instance.into();
        let (event_tx, event_rx) = mpsc::channel(event_channel_capacity.max(1));
        Self {
            logger: SessionLogger::new(&instance),
            instance,
            profile: Profile::new("default"),
            options: RwLock::new(options),
            apis: ApiRegistry::new(),
            ready_gate: Gate::new(),
            done_gate: Gate::new(),
            closed_gate: Gate::new(),
            user_closed_gate: Gate::new(),
            terminate_context: CancellationToken::new(),
            kill_context: CancellationToken::new(),
            event_tx,
            event_rx: Mutex::new(Some(event_rx)),
            service_infos: RwLock::new(HashMap::new()),
            allow_user_cancel: AtomicBool::new(true),
            terminated: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            valid: AtomicBool::new(true),
            last_error: Mutex::new(None),
        }
    }

    /// Replace the default `"default"`-named profile with one under
    /// `name`, used by the initializer once the active `--profile` flag
    /// and development-build suffix are known.
    pub fn with_profile_name(mut self, name: impl Into<String>) -> Self {
        self.profile = Profile::new(name);
        self
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn logger(&self) -> &SessionLogger {
        &self.logger
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn allow_user_cancel(&self) -> bool {
        self.allow_user_cancel.load(Ordering::SeqCst)
    }

    pub fn set_allow_user_cancel(&self, allow: bool) {
        self.allow_user_cancel.store(allow, Ordering::SeqCst);
    }

    /// Mark the session ready for use: the boot phase has completed and
    /// waiters on [`Session::ready`] may proceed.
    pub fn mark_ready(&self) {
        self.ready_gate.close();
    }

    /// Resolves once the session has finished booting.
    pub async fn ready(&self) {
        self.ready_gate.closed().await;
    }

    /// Resolves once the engine's run loop has exited.
    pub async fn done(&self) {
        self.done_gate.closed().await;
    }

    pub fn mark_done(&self) {
        self.done_gate.close();
    }

    /// Resolves once a terminate has been requested (signal, `destroy`,
    /// or engine-initiated stop).
    pub async fn closed(&self) {
        self.closed_gate.closed().await;
    }

    /// Resolves only if the terminate was user-initiated (e.g. Ctrl-C),
    /// distinguishing it from an internally-triggered shutdown.
    pub async fn user_closed(&self) {
        self.user_closed_gate.closed().await;
    }

    pub fn terminate_context(&self) -> CancellationToken {
        self.terminate_context.clone()
    }

    pub fn kill_context(&self) -> CancellationToken {
        self.kill_context.clone()
    }

    pub fn err(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// Request a graceful terminate. Idempotent; the first call wins.
    pub fn terminate(&self, user_initiated: bool) {
        if self
            .terminated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.terminate_context.cancel();
            self.closed_gate.close();
            if user_initiated {
                self.user_closed_gate.close();
            }
        }
    }

    /// Force an immediate kill, e.g. after the graceful shutdown deadline
    /// elapses. Implies `terminate`.
    pub fn kill(&self) {
        self.terminate(false);
        self.kill_context.cancel();
    }

    /// Tear the session down exactly once, recording the terminating error
    /// (if any) and releasing every gate so outstanding waiters unblock.
    pub fn destroy(&self, err: Option<String>) {
        if self
            .disposed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.valid.store(false, Ordering::SeqCst);
        if err.is_some() {
            *self.last_error.lock() = err;
        }
        self.terminate_context.cancel();
        self.kill_context.cancel();
        self.ready_gate.close();
        self.closed_gate.close();
        self.done_gate.close();
    }

    /// Read a setting, preferring the profile's runtime value and falling
    /// back to the declared options-store default.
    pub fn get(&self, key: &str) -> rt_core::Value {
        if self.profile.has(key) {
            self.profile.get(key)
        } else {
            self.options.read().get(key)
        }
    }

    /// Write a value. Writes go only to the options store: a
    /// `fs.`-prefixed key is always rejected; an `app.`-prefixed key is
    /// logged as a warning but still written if declared.
    pub fn set(&self, key: &str, value: rt_core::Value) -> Result<(), Error> {
        if key.starts_with("fs.") {
            return Err(SessionError::FsWriteRejected(key.to_string()).into());
        }
        if key.starts_with("app.") {
            self.logger
                .warn(&format!("writing to reserved-prefix key '{key}'"));
        }
        self.options.write().set(key, value)?;
        Ok(())
    }

    pub fn has(&self, key: &str) -> bool {
        self.profile.has(key) || self.options.read().has(key)
    }

    /// Read a profile setting specifically, bypassing the options fallback.
    pub fn setting(&self, key: &str) -> rt_core::Value {
        self.profile.get(key)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The full options store. Use [`Session::config`] when only the
    /// read-only `CONFIG`-kind subset is relevant.
    pub fn opts(&self) -> RwLockReadGuard<'_, OptionsStore> {
        self.options.read()
    }

    /// Mutable access to the options store, used by the initializer while
    /// wiring addon options and by nobody else once sealed.
    pub fn opts_mut(&self) -> RwLockWriteGuard<'_, OptionsStore> {
        self.options.write()
    }

    /// The options store, framed as the configuration surface addons read
    /// at startup. Currently the same store as [`Session::opts`]: the
    /// distinction is about caller intent, not storage.
    pub fn config(&self) -> RwLockReadGuard<'_, OptionsStore> {
        self.options.read()
    }

    pub fn apis(&self) -> &ApiRegistry {
        &self.apis
    }

    pub fn api<T: 'static + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.apis.get::<T>(name)
    }

    /// Enqueue an event for dispatch to registered listeners. The channel
    /// has a fixed capacity; once full, this blocks the caller rather than
    /// dropping the event, providing natural backpressure. The only case in
    /// which an event is dropped is a disposed session, logged at debug.
    pub async fn dispatch(&self, event: Event) {
        if self.is_disposed() {
            self.logger.debug(&format!(
                "event dropped (session disposed): {}.{}",
                event.scope, event.key
            ));
            return;
        }
        if self.event_tx.send(event).await.is_err() {
            self.logger
                .debug("event dropped: dispatcher channel closed");
        }
    }

    /// Take ownership of the event receiver. Must be called at most once,
    /// typically by the engine's dispatcher loop during boot.
    pub fn take_event_receiver(&self) -> Option<mpsc::Receiver<Event>> {
        self.event_rx.lock().take()
    }

    pub fn service_info(&self, address: &Address) -> Option<ServiceInfo> {
        self.service_infos.read().get(address).cloned()
    }

    pub fn set_service_info(&self, address: Address, info: ServiceInfo) {
        self.service_infos.write().insert(address, info);
    }

    pub fn service_infos(&self) -> HashMap<Address, ServiceInfo> {
        self.service_infos.read().clone()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
