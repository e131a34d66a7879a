// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn declare_then_set_round_trips() {
    let mut opts = Options::new("app");
    opts.declare(OptionSpec::new("app.name", "demo", Kind::CONFIG))
        .unwrap();
    opts.set("app.name", Value::from("custom")).unwrap();
    assert_eq!(opts.get("app.name"), Value::from("custom"));
}

#[test]
fn declare_rejects_invalid_key() {
    let mut opts = Options::new("app");
    let err = opts
        .declare(OptionSpec::new("App.Name", "x", Kind::CONFIG))
        .unwrap_err();
    assert!(matches!(err, OptionError::InvalidKey(_)));
}

#[test]
fn declare_rejects_duplicate_key() {
    let mut opts = Options::new("app");
    opts.declare(OptionSpec::new("app.name", "x", Kind::CONFIG))
        .unwrap();
    let err = opts
        .declare(OptionSpec::new("app.name", "y", Kind::CONFIG))
        .unwrap_err();
    assert!(matches!(err, OptionError::Duplicate(_)));
}

#[test]
fn set_rejects_undeclared_key_without_wildcard() {
    let mut opts = Options::new("app");
    let err = opts.set("app.unknown", Value::from("x")).unwrap_err();
    assert!(matches!(err, OptionError::NotAccepted(_)));
}

#[test]
fn wildcard_accepts_any_key_not_otherwise_declared() {
    let mut opts = Options::new("app");
    opts.declare(OptionSpec::new(WILDCARD_KEY, Value::Null, Kind::RUNTIME))
        .unwrap();
    assert!(opts.accepts("app.whatever"));
    opts.set("app.whatever", Value::from("ok")).unwrap();
    assert_eq!(opts.get("app.whatever"), Value::from("ok"));
}

#[test]
fn wildcard_validator_is_consulted_for_unknown_keys() {
    let mut opts = Options::new("app");
    opts.declare(
        OptionSpec::new(WILDCARD_KEY, Value::Null, Kind::RUNTIME).with_validator(|v| {
            if matches!(v, Value::Int(_)) {
                Ok(())
            } else {
                Err("wildcard only accepts ints".into())
            }
        }),
    )
    .unwrap();
    let err = opts.set("app.anything", Value::from("nope")).unwrap_err();
    assert!(matches!(err, OptionError::Validation(_, _)));
    opts.set("app.anything", Value::Int(1)).unwrap();
}

#[test]
fn read_only_value_rejects_further_writes() {
    let mut opts = Options::new("app");
    opts.declare(OptionSpec::new(
        "app.locked",
        "first",
        Kind::CONFIG | Kind::READ_ONLY,
    ))
    .unwrap();
    opts.set("app.locked", Value::from("first")).unwrap();
    let err = opts.set("app.locked", Value::from("second")).unwrap_err();
    assert!(matches!(err, OptionError::ReadOnly(_)));
}

#[test]
fn seal_materializes_defaults_for_unset_keys() {
    let mut opts = Options::new("app");
    opts.declare(OptionSpec::new("app.name", "demo", Kind::CONFIG))
        .unwrap();
    opts.seal().unwrap();
    assert_eq!(opts.get("app.name"), Value::from("demo"));
}

#[test]
fn seal_is_not_reentrant() {
    let mut opts = Options::new("app");
    opts.seal().unwrap();
    let err = opts.seal().unwrap_err();
    assert!(matches!(err, OptionError::AlreadySealed));
}

#[test]
fn declare_after_seal_fails() {
    let mut opts = Options::new("app");
    opts.seal().unwrap();
    let err = opts
        .declare(OptionSpec::new("app.late", "x", Kind::CONFIG))
        .unwrap_err();
    assert!(matches!(err, OptionError::Sealed));
}

#[test]
fn set_after_seal_still_succeeds_when_kind_permits() {
    let mut opts = Options::new("app");
    opts.declare(OptionSpec::new("app.name", "demo", Kind::RUNTIME))
        .unwrap();
    opts.seal().unwrap();
    opts.set("app.name", Value::from("renamed")).unwrap();
    assert_eq!(opts.get("app.name"), Value::from("renamed"));
}

#[test]
fn validation_failure_during_seal_is_surfaced() {
    let mut opts = Options::new("app");
    opts.declare(
        OptionSpec::new("app.count", Value::Int(-1), Kind::CONFIG)
            .with_validator(|v| match v {
                Value::Int(n) if *n >= 0 => Ok(()),
                _ => Err("must be non-negative".into()),
            }),
    )
    .unwrap();
    let err = opts.seal().unwrap_err();
    assert!(matches!(err, OptionError::Validation(_, _)));
}

#[test]
fn range_visits_every_stored_entry() {
    let mut opts = Options::new("app");
    opts.declare(OptionSpec::new("app.a", "1", Kind::CONFIG))
        .unwrap();
    opts.declare(OptionSpec::new("app.b", "2", Kind::CONFIG))
        .unwrap();
    opts.seal().unwrap();

    let mut seen = Vec::new();
    opts.range(|k, v| seen.push((k.to_string(), v.clone())));
    seen.sort();
    assert_eq!(
        seen,
        vec![
            ("app.a".to_string(), Value::from("1")),
            ("app.b".to_string(), Value::from("2")),
        ]
    );
}

#[test]
fn describe_returns_declared_description() {
    let mut opts = Options::new("app");
    opts.declare(
        OptionSpec::new("app.name", "demo", Kind::CONFIG).with_description("the app's name"),
    )
    .unwrap();
    assert_eq!(opts.describe("app.name"), Some("the app's name"));
}

#[test]
fn get_of_unset_key_is_empty_sentinel_not_error() {
    let opts = Options::new("app");
    assert_eq!(opts.get("app.nope"), Value::Null);
}
