// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier grammar for option keys: dot-separated segments of
//! `[a-z][a-z0-9_]*`, e.g. `app.engine.throttle_ticks`.

use regex::Regex;
use std::sync::OnceLock;

fn key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)*$").expect("valid key grammar regex")
    })
}

/// True if `key` matches the dot-separated identifier grammar, or is the
/// literal wildcard key `"*"`.
pub fn is_valid_key(key: &str) -> bool {
    key == crate::option::WILDCARD_KEY || key_regex().is_match(key)
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
