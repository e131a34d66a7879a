// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rt_options::OptionsStore;

#[tokio::test]
async fn init_publishes_stats_under_the_api_registry() {
    let session = Arc::new(Session::new("test-instance", OptionsStore::new()));
    let svc = StatsService::new();
    svc.init(session.clone()).await.unwrap();

    let stats = session.api::<Stats>("stats").unwrap();
    assert_eq!(stats.snapshot(), (0, 0, 0));
}

#[tokio::test]
async fn tick_increments_ticks_observed_and_running_count() {
    let session = Arc::new(Session::new("test-instance", OptionsStore::new()));
    let svc = StatsService::new();
    svc.init(session.clone()).await.unwrap();

    svc.tick(session.clone(), Utc::now(), Duration::from_secs(1))
        .await
        .unwrap();

    let (ticks, _events, running) = svc.stats().snapshot();
    assert_eq!(ticks, 1);
    assert_eq!(running, 0);
}

#[test]
fn wildcard_listener_increments_events_dispatched() {
    let svc = StatsService::new();
    let listeners = svc.listeners();
    assert_eq!(listeners.len(), 1);
    let (key, callback) = &listeners[0];
    assert_eq!(key, "any");
    callback(&Event::new("anything", "at.all")).unwrap();
    assert_eq!(svc.stats().snapshot().1, 1);
}
