// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A one-way gate: closes exactly once, awaitable any number of times.
//!
//! Backs `Session::Ready`/`Done`/`Closed`/`UserClosed` — each is a gate
//! that is open until the corresponding lifecycle event fires, after which
//! every waiter (present and future) observes it as closed.

use tokio::sync::watch;

#[derive(Clone)]
pub struct Gate {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl Gate {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    pub fn is_closed(&self) -> bool {
        *self.rx.borrow()
    }

    /// Close the gate. Idempotent: closing an already-closed gate is a no-op.
    pub fn close(&self) {
        let _ = self.tx.send(true);
    }

    /// Resolve once the gate is closed; resolves immediately if it already is.
    pub async fn closed(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
