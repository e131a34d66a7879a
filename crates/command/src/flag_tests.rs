// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn switch_defaults_to_no_value() {
    let flag = Flag::switch("debug");
    assert!(!flag.takes_value);
    assert!(flag.default.is_none());
}

#[test]
fn value_flag_carries_its_default() {
    let flag = Flag::value("profile").with_default("default");
    assert!(flag.takes_value);
    assert_eq!(flag.default, Some(Value::from("default")));
}

#[test]
fn to_arg_reflects_name_and_short() {
    let flag = Flag::switch("verbose").with_short('v').global();
    let arg = flag.to_arg();
    assert_eq!(arg.get_id().as_str(), "verbose");
    assert_eq!(arg.get_short(), Some('v'));
}
