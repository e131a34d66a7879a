// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

struct Thing(u32);
struct Other;

#[test]
fn register_and_get_round_trips() {
    let registry = ApiRegistry::new();
    registry.register("thing", Arc::new(Thing(42)));
    let got = registry.get::<Thing>("thing").unwrap();
    assert_eq!(got.0, 42);
}

#[test]
fn unregistered_name_returns_none() {
    let registry = ApiRegistry::new();
    assert!(registry.get::<Thing>("missing").is_none());
}

#[test]
fn wrong_type_downcast_returns_none() {
    let registry = ApiRegistry::new();
    registry.register("thing", Arc::new(Thing(1)));
    assert!(registry.get::<Other>("thing").is_none());
}

#[test]
fn has_reflects_registration() {
    let registry = ApiRegistry::new();
    assert!(!registry.has("thing"));
    registry.register("thing", Arc::new(Thing(1)));
    assert!(registry.has("thing"));
}
