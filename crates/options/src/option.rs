// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single declared option entry.

use rt_core::event::Value;
use std::fmt;
use std::sync::Arc;

/// Bitmask describing what an option is for and how it may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kind(u8);

impl Kind {
    pub const RUNTIME: Kind = Kind(1 << 0);
    pub const READ_ONLY: Kind = Kind(1 << 1);
    pub const SETTINGS: Kind = Kind(1 << 2);
    pub const CONFIG: Kind = Kind(1 << 3);

    pub const fn empty() -> Self {
        Kind(0)
    }

    pub const fn contains(self, other: Kind) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Kind) -> Self {
        Kind(self.0 | other.0)
    }

    pub fn is_read_only(self) -> bool {
        self.contains(Kind::READ_ONLY)
    }
}

impl std::ops::BitOr for Kind {
    type Output = Kind;
    fn bitor(self, rhs: Kind) -> Kind {
        self.union(rhs)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.contains(Kind::RUNTIME) {
            parts.push("runtime");
        }
        if self.contains(Kind::READ_ONLY) {
            parts.push("read_only");
        }
        if self.contains(Kind::SETTINGS) {
            parts.push("settings");
        }
        if self.contains(Kind::CONFIG) {
            parts.push("config");
        }
        write!(f, "{}", parts.join("|"))
    }
}

/// Predicate consulted before a value is accepted for a key.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// The wildcard key: accepts any key not otherwise declared.
pub const WILDCARD_KEY: &str = "*";

/// A declared configuration entry.
#[derive(Clone)]
pub struct OptionSpec {
    pub key: String,
    pub default: Value,
    pub kind: Kind,
    pub description: String,
    pub validator: Option<Validator>,
}

impl OptionSpec {
    pub fn new(key: impl Into<String>, default: impl Into<Value>, kind: Kind) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            kind,
            description: String::new(),
            validator: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match &self.validator {
            Some(v) => v(value),
            None => Ok(()),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.key == WILDCARD_KEY
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
