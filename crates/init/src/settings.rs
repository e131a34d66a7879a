// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The settings blueprint: the declared shape of the persisted profile,
//! assembled from the application's own settings value plus every addon's
//! settings group, then materialized onto a [`rt_session::Profile`] during
//! path/profile configuration.
//!
//! Settings schemas and profile persistence are kept external to this
//! crate; here that surface is modeled as a small trait so an application
//! brings its own settings type and the runtime only needs
//! `settings()`/`migrations()` from it — bring your own value type, the
//! runtime only needs a narrow trait.

use crate::migration::KeyMigration;
use rt_core::Value;

/// One declared profile setting: its key, default value, and whether it
/// is written to `profile.preferences` on exit.
#[derive(Debug, Clone)]
pub struct SettingSpec {
    pub key: String,
    pub default: Value,
    pub persistent: bool,
}

impl SettingSpec {
    pub fn new(key: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            persistent: false,
        }
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

/// Supplied by the application (and, separately, by each addon) to extend
/// the profile schema. The canonical shape keys durations in dot-separated
/// form, e.g. `app.engine.throttle_ticks` — never the legacy
/// `app.throttle.ticks` form; the initializer registers a migration from
/// the old key rather than accepting both shapes indefinitely.
pub trait SettingsBlueprint: Send + Sync {
    fn settings(&self) -> Vec<SettingSpec>;

    /// Key migrations this blueprint contributes, chained by the
    /// initializer's [`crate::MigrationRegistry`] during profile load.
    fn migrations(&self) -> Vec<KeyMigration> {
        Vec::new()
    }
}

/// An empty blueprint, used when an application or addon has no settings
/// of its own.
pub struct EmptyBlueprint;

impl SettingsBlueprint for EmptyBlueprint {
    fn settings(&self) -> Vec<SettingSpec> {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
