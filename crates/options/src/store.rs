// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The options store: an ordered mapping of owner name to [`Options`].
//!
//! A typical process has one store per addon plus the root `"app"` options;
//! the initializer merges each addon's options into the session's store
//! under a name prefix.

use crate::options::Options;
use indexmap::IndexMap;
use rt_core::error::OptionError;
use rt_core::event::Value;

pub struct OptionsStore {
    owners: IndexMap<String, Options>,
}

impl OptionsStore {
    pub fn new() -> Self {
        Self {
            owners: IndexMap::new(),
        }
    }

    /// Get or create the named owner's `Options`.
    pub fn owner_mut(&mut self, name: &str) -> &mut Options {
        self.owners
            .entry(name.to_string())
            .or_insert_with(|| Options::new(name))
    }

    pub fn owner(&self, name: &str) -> Option<&Options> {
        self.owners.get(name)
    }

    pub fn owners(&self) -> impl Iterator<Item = &Options> {
        self.owners.values()
    }

    /// Seal every owner's options. Fails on the first owner that rejects.
    pub fn seal_all(&mut self) -> Result<(), OptionError> {
        for owner in self.owners.values_mut() {
            owner.seal()?;
        }
        Ok(())
    }

    /// Look up a key across all owners (first match wins, in insertion
    /// order of owners), falling back to the empty sentinel.
    pub fn get(&self, key: &str) -> Value {
        for owner in self.owners.values() {
            if owner.has(key) {
                return owner.get(key);
            }
        }
        Value::Null
    }

    pub fn has(&self, key: &str) -> bool {
        self.owners.values().any(|o| o.has(key))
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.owners.values().any(|o| o.accepts(key))
    }

    /// Set a key on whichever owner currently accepts it.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), OptionError> {
        for owner in self.owners.values_mut() {
            if owner.accepts(key) {
                return owner.set(key, value);
            }
        }
        Err(OptionError::NotAccepted(key.to_string()))
    }

    /// Merge `source`'s declared keys and values into `self`'s `dest_owner`,
    /// prefixing each key with `prefix.` — used when wiring an addon's own
    /// options into the session's store.
    pub fn merge_prefixed(&mut self, dest_owner: &str, prefix: &str, source: &Options) {
        let dest = self.owner_mut(dest_owner);
        source.range(|key, value| {
            let prefixed = format!("{prefix}.{key}");
            if !dest.accepts(&prefixed) {
                let _ = dest.declare(crate::option::OptionSpec::new(
                    prefixed.clone(),
                    value.clone(),
                    crate::option::Kind::RUNTIME,
                ));
            }
            let _ = dest.set(&prefixed, value.clone());
        });
    }
}

impl Default for OptionsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
