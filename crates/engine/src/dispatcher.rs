// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event dispatcher: a single concurrent consumer of the
//! session's event channel. For each event: skip unregistered scope.key
//! pairs; fan out `services.start.services`/`services.stop.services`
//! payloads to `serviceStart`/`serviceStop`; fan out every event to every
//! registered service container's listener map.

use crate::engine::Engine;
use rt_core::{Address, Event, Value};
use rt_session::Session;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Drain `rx` until the event context is cancelled or the channel closes.
///
/// The `biased` ordering matters: `Engine::stop` stops every running
/// service before cancelling `ev_ctx`, which queues `service.stopped`
/// events ahead of the cancellation. Polling `rx.recv()` first, on every
/// loop iteration, guarantees those already-buffered events are dispatched
/// before this task honors the cancellation and returns.
pub async fn run(
    engine: Arc<Engine>,
    session: Arc<Session>,
    mut rx: mpsc::Receiver<Event>,
    ev_ctx: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            received = rx.recv() => match received {
                Some(event) => event,
                None => return,
            },
            _ = ev_ctx.cancelled() => return,
        };
        dispatch_one(&engine, &session, event).await;
    }
}

async fn dispatch_one(engine: &Arc<Engine>, session: &Arc<Session>, event: Event) {
    let key = event.registry_key();
    if !engine.is_event_registered(&key) {
        debug!(key = %key, "dispatch: unregistered event, ignoring");
        return;
    }

    if event.scope == "services" && (event.key == "start.services" || event.key == "stop.services")
    {
        let addresses = addresses_from_payload(&event);
        let mut tasks = Vec::with_capacity(addresses.len());
        for addr in addresses {
            let engine = engine.clone();
            let session = session.clone();
            let starting = event.key == "start.services";
            tasks.push(tokio::spawn(async move {
                if starting {
                    engine.service_start(session, &addr).await;
                } else {
                    engine.service_stop(session, &addr, None).await;
                }
            }));
        }
        for task in tasks {
            let _ = task.await;
        }
    }

    for container in engine.containers() {
        container.handle_event(session, &event);
    }
}

fn addresses_from_payload(event: &Event) -> Vec<Address> {
    match event.payload.get("addresses") {
        Some(Value::List(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Address::from_str(s).ok(),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
