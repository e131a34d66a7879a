// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::container::ServiceContainer;
use crate::service::Service;
use async_trait::async_trait;
use rt_options::OptionsStore;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingService {
    starts: Arc<AtomicUsize>,
}

#[async_trait]
impl Service for CountingService {
    fn name(&self) -> &str {
        "counter"
    }
    async fn start(&self, _session: Arc<Session>) -> Result<(), rt_core::ServiceError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn host_address() -> Address {
    Address::instance("host", "main")
}

#[tokio::test]
async fn unregistered_event_is_dropped_without_side_effects() {
    let engine = Arc::new(Engine::new(host_address()));
    let session = Arc::new(Session::new("test-instance", OptionsStore::new()));
    dispatch_one(&engine, &session, Event::new("nobody", "knows")).await;
}

#[tokio::test]
async fn start_services_event_starts_the_named_service() {
    let engine = Arc::new(Engine::new(host_address()));
    engine.register_event("services", "start.services").unwrap();
    let session = Arc::new(Session::new("test-instance", OptionsStore::new()));

    let starts = Arc::new(AtomicUsize::new(0));
    let address = engine
        .register_service(&session, Arc::new(CountingService { starts: starts.clone() }))
        .unwrap();
    engine
        .container(&address)
        .unwrap()
        .initialize(session.clone())
        .await
        .unwrap();

    let event = Event::new("services", "start.services")
        .with_payload("addresses", rt_core::Value::List(vec![Value::String(address.to_string())]));
    dispatch_one(&engine, &session, event).await;

    assert_eq!(starts.load(Ordering::SeqCst), 1);
    assert!(engine.container(&address).unwrap().is_running());
}

#[tokio::test]
async fn dispatch_fans_out_to_every_container_listener() {
    let engine = Arc::new(Engine::new(host_address()));
    engine.register_event("demo", "tick").unwrap();
    let session = Arc::new(Session::new("test-instance", OptionsStore::new()));

    struct Listener1 {
        calls: Arc<AtomicUsize>,
    }
    #[async_trait]
    impl Service for Listener1 {
        fn name(&self) -> &str {
            "listener"
        }
        fn listeners(&self) -> Vec<(String, crate::service::Listener)> {
            let calls = self.calls.clone();
            vec![(
                "demo.tick".to_string(),
                Arc::new(move |_e: &Event| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )]
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let address = engine
        .register_service(
            &session,
            Arc::new(Listener1 {
                calls: calls.clone(),
            }),
        )
        .unwrap();
    let _ = address;

    dispatch_one(&engine, &session, Event::new("demo", "tick")).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn run_exits_when_event_context_is_cancelled() {
    let engine = Arc::new(Engine::new(host_address()));
    let session = Arc::new(Session::new("test-instance", OptionsStore::new()));
    let (_tx, rx) = mpsc::channel(4);
    let ctx = CancellationToken::new();
    ctx.cancel();
    tokio::time::timeout(std::time::Duration::from_millis(200), run(engine, session, rx, ctx))
        .await
        .expect("dispatcher should exit promptly once cancelled");
}
