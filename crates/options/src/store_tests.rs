// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::option::{Kind, OptionSpec};

#[test]
fn owner_mut_creates_owner_on_first_access() {
    let mut store = OptionsStore::new();
    store.owner_mut("app");
    assert!(store.owner("app").is_some());
}

#[test]
fn get_falls_back_to_empty_sentinel_when_absent() {
    let store = OptionsStore::new();
    assert_eq!(store.get("app.missing"), Value::Null);
}

#[test]
fn set_routes_to_the_owner_that_accepts_the_key() {
    let mut store = OptionsStore::new();
    store
        .owner_mut("app")
        .declare(OptionSpec::new("app.name", "demo", Kind::CONFIG))
        .unwrap();
    store.set("app.name", Value::from("renamed")).unwrap();
    assert_eq!(store.get("app.name"), Value::from("renamed"));
}

#[test]
fn set_of_unaccepted_key_fails() {
    let mut store = OptionsStore::new();
    let err = store.set("nobody.owns.this", Value::from("x")).unwrap_err();
    assert!(matches!(err, OptionError::NotAccepted(_)));
}

#[test]
fn seal_all_seals_every_owner() {
    let mut store = OptionsStore::new();
    store
        .owner_mut("app")
        .declare(OptionSpec::new("app.name", "demo", Kind::CONFIG))
        .unwrap();
    store
        .owner_mut("addon")
        .declare(OptionSpec::new("addon.thing", "x", Kind::CONFIG))
        .unwrap();
    store.seal_all().unwrap();
    assert!(store.owner("app").unwrap().is_sealed());
    assert!(store.owner("addon").unwrap().is_sealed());
}

#[test]
fn merge_prefixed_copies_source_values_under_prefix() {
    let mut addon_opts = Options::new("metrics");
    addon_opts
        .declare(OptionSpec::new("interval", "30s", Kind::CONFIG))
        .unwrap();
    addon_opts.seal().unwrap();

    let mut store = OptionsStore::new();
    store.merge_prefixed("app", "metrics", &addon_opts);

    assert_eq!(store.get("app.interval"), Value::from("30s"));
}
