// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flat key-renaming migration for persisted preferences: unknown keys may
//! be auto-migrated through a declared mapping.
//!
//! A flat `keyfrom -> keyto` rename table, rather than chained
//! version-to-version transforms, since a profile here is a key/value list
//! rather than a versioned snapshot document.

use rt_core::Value;
use std::collections::HashMap;

/// A single declared rename: a preference persisted under `from` in an
/// older build is read back as `to`.
#[derive(Debug, Clone)]
pub struct KeyMigration {
    pub from: String,
    pub to: String,
}

impl KeyMigration {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Accumulates every `KeyMigration` contributed by the application and its
/// addons, and applies them to a decoded preferences list at load time.
#[derive(Default)]
pub struct MigrationRegistry {
    renames: HashMap<String, String>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, migration: KeyMigration) {
        self.renames.insert(migration.from, migration.to);
    }

    pub fn extend(&mut self, migrations: impl IntoIterator<Item = KeyMigration>) {
        for m in migrations {
            self.register(m);
        }
    }

    /// Rewrite any entry whose key matches a declared `from` to its `to`
    /// name, leaving already-current keys untouched. Declared settings
    /// without a migration entry pass through unchanged.
    pub fn apply(&self, entries: Vec<(String, Value)>) -> Vec<(String, Value)> {
        entries
            .into_iter()
            .map(|(key, value)| match self.renames.get(&key) {
                Some(renamed) => (renamed.clone(), value),
                None => (key, value),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
