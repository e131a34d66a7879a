// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single named declared-option set with its backing value map.
//!
//! Operations: `declare`, `set`, `get`, `has`, `seal`, `accepts`, `range`,
//! `describe`.

use crate::key::is_valid_key;
use crate::option::{Kind, OptionSpec, WILDCARD_KEY};
use indexmap::IndexMap;
use rt_core::error::OptionError;
use rt_core::event::Value;

/// An internal override used only by the initializer to install declared
/// defaults during seal, bypassing the read-only rejection that would
/// otherwise apply to a value a previous `set` already marked read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    Normal,
    InstallDefault,
}

#[derive(Debug, Clone)]
struct StoredValue {
    value: Value,
    read_only: bool,
}

/// Declared option set, backing value map, and seal state for one named
/// owner (e.g. `"app"`, or an addon's name).
pub struct Options {
    name: String,
    declared: IndexMap<String, OptionSpec>,
    values: IndexMap<String, StoredValue>,
    sealed: bool,
}

impl Options {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: IndexMap::new(),
            values: IndexMap::new(),
            sealed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Add a declared option. Fails if the key is invalid, already
    /// declared, or the store is sealed.
    pub fn declare(&mut self, spec: OptionSpec) -> Result<(), OptionError> {
        if self.sealed {
            return Err(OptionError::Sealed);
        }
        if !is_valid_key(&spec.key) {
            return Err(OptionError::InvalidKey(spec.key));
        }
        if self.declared.contains_key(&spec.key) {
            return Err(OptionError::Duplicate(spec.key));
        }
        self.declared.insert(spec.key.clone(), spec);
        Ok(())
    }

    /// True if `key` is declared, or a wildcard declaration exists.
    pub fn accepts(&self, key: &str) -> bool {
        self.declared.contains_key(key) || self.declared.contains_key(WILDCARD_KEY)
    }

    fn resolve_spec(&self, key: &str) -> Option<&OptionSpec> {
        self.declared
            .get(key)
            .or_else(|| self.declared.get(WILDCARD_KEY))
    }

    /// Write a value. Fails with `NotAccepted` if no declaration/wildcard
    /// matches, `ReadOnly` if the stored entry is already read-only (unless
    /// called with the internal default-install override), or `Validation`
    /// if the resolved spec's validator rejects the value.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), OptionError> {
        self.set_inner(key, value, WriteMode::Normal)
    }

    pub(crate) fn set_inner(
        &mut self,
        key: &str,
        value: Value,
        mode: WriteMode,
    ) -> Result<(), OptionError> {
        if let Some(existing) = self.values.get(key) {
            if existing.read_only && mode != WriteMode::InstallDefault {
                return Err(OptionError::ReadOnly(key.to_string()));
            }
        }

        let spec = self
            .resolve_spec(key)
            .ok_or_else(|| OptionError::NotAccepted(key.to_string()))?;

        spec.validate(&value)
            .map_err(|reason| OptionError::Validation(key.to_string(), reason))?;

        let read_only = spec.kind.is_read_only();
        self.values.insert(
            key.to_string(),
            StoredValue { value, read_only },
        );
        Ok(())
    }

    /// Read a value, or the empty sentinel (`Value::Null`) if unset.
    pub fn get(&self, key: &str) -> Value {
        self.values
            .get(key)
            .map(|v| v.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Materialize declared defaults for all keys not yet set, then mark
    /// sealed. Fails if already sealed or a default fails its validator.
    pub fn seal(&mut self) -> Result<(), OptionError> {
        if self.sealed {
            return Err(OptionError::AlreadySealed);
        }
        let declared: Vec<(String, Value)> = self
            .declared
            .values()
            .filter(|spec| !spec.is_wildcard())
            .map(|spec| (spec.key.clone(), spec.default.clone()))
            .collect();

        for (key, default) in declared {
            if !self.values.contains_key(&key) {
                self.set_inner(&key, default, WriteMode::InstallDefault)?;
            }
        }
        self.sealed = true;
        Ok(())
    }

    /// Iterate entries in insertion order (stable).
    pub fn range(&self, mut f: impl FnMut(&str, &Value)) {
        for (key, stored) in &self.values {
            f(key, &stored.value);
        }
    }

    pub fn describe(&self, key: &str) -> Option<&str> {
        self.resolve_spec(key).map(|s| s.description.as_str())
    }

    pub fn kind_of(&self, key: &str) -> Option<Kind> {
        self.resolve_spec(key).map(|s| s.kind)
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
