// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal-driven cancellation. SIGINT/SIGTERM request a graceful
//! terminate — a user-initiated [`Session::terminate`] when the session
//! allows it, otherwise an immediate [`Session::destroy`]. A second signal
//! always forces [`Session::kill`] (a kill signal always destroys);
//! SIGKILL is observed by the OS, not by this process, and cannot be
//! handled.
//!
//! Built on `tokio::signal::unix` SIGTERM/SIGINT handling, wired to drive
//! the session's cancellation gates rather than break a loop directly,
//! since this runtime's shutdown is session-driven.

use rt_session::Session;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Spawn the process-wide signal handler. The returned handle should be
/// aborted once the session is done; it runs forever otherwise.
pub fn spawn(session: Arc<Session>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "failed to install SIGINT handler");
                return;
            }
        };

        let received_once = AtomicBool::new(false);
        loop {
            tokio::select! {
                _ = sigterm.recv() => handle_signal(&session, &received_once, "SIGTERM"),
                _ = sigint.recv() => handle_signal(&session, &received_once, "SIGINT"),
            }
            if session.is_disposed() {
                return;
            }
        }
    })
}

fn handle_signal(session: &Arc<Session>, received_once: &AtomicBool, name: &str) {
    if received_once.swap(true, Ordering::SeqCst) {
        info!(signal = name, "second signal received, forcing kill");
        session.kill();
        session.destroy(Some(format!("killed by {name}")));
        return;
    }
    if session.allow_user_cancel() {
        info!(signal = name, "received, requesting graceful shutdown");
        session.terminate(true);
    } else {
        info!(signal = name, "received, destroying session");
        session.destroy(Some(format!("terminated by {name}")));
    }
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
