// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persisted profile: the user-settable subset of settings identified
//! by a name, loaded from disk at startup.
//!
//! Only the wire codec lives here (pure, no filesystem access) — the
//! initializer owns the actual `<config>/.../profile.preferences` read/write
//! during initializer path/profile configuration.

use indexmap::IndexMap;
use parking_lot::RwLock;
use rt_core::event::Value;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// A single profile setting: its current value and whether it is
/// persisted to `profile.preferences` on exit.
#[derive(Debug, Clone)]
pub struct ProfileSetting {
    pub value: Value,
    pub persistent: bool,
}

/// Process-wide persisted profile, keyed by setting name.
pub struct Profile {
    name: String,
    settings: RwLock<IndexMap<String, ProfileSetting>>,
    dirty: AtomicBool,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: RwLock::new(IndexMap::new()),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a setting with its default value and persistence flag.
    /// Does not overwrite an already-present value (e.g. loaded from disk).
    pub fn declare(&self, key: impl Into<String>, default: Value, persistent: bool) {
        let mut settings = self.settings.write();
        settings.entry(key.into()).or_insert(ProfileSetting {
            value: default,
            persistent,
        });
    }

    pub fn get(&self, key: &str) -> Value {
        self.settings
            .read()
            .get(key)
            .map(|s| s.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn has(&self, key: &str) -> bool {
        self.settings.read().contains_key(key)
    }

    /// Set a setting's value. Marks the profile dirty if the setting is
    /// persistent and the value actually changed.
    pub fn set(&self, key: &str, value: Value) {
        let mut settings = self.settings.write();
        match settings.get_mut(key) {
            Some(setting) => {
                if setting.value != value {
                    setting.value = value;
                    if setting.persistent {
                        self.dirty.store(true, Ordering::SeqCst);
                    }
                }
            }
            None => {
                settings.insert(
                    key.to_string(),
                    ProfileSetting {
                        value,
                        persistent: false,
                    },
                );
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn mark_clean(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Snapshot of every persistent (name, value) pair, in declaration order.
    pub fn persistent_entries(&self) -> Vec<(String, Value)> {
        self.settings
            .read()
            .iter()
            .filter(|(_, s)| s.persistent)
            .map(|(k, s)| (k.clone(), s.value.clone()))
            .collect()
    }

    /// Load persistent entries from a decoded preferences file, overwriting
    /// any matching declared defaults.
    pub fn load_persistent(&self, entries: Vec<(String, Value)>) {
        let mut settings = self.settings.write();
        for (key, value) in entries {
            settings
                .entry(key)
                .and_modify(|s| s.value = value.clone())
                .or_insert(ProfileSetting {
                    value,
                    persistent: true,
                });
        }
    }
}

/// One (name, value) pair as persisted to `profile.preferences`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct PreferenceEntry {
    name: String,
    value: Value,
}

/// Errors from the preferences wire codec.
#[derive(Debug, thiserror::Error)]
pub enum PreferencesCodecError {
    #[error("io error: {0}")]
    Io(String),
    #[error("corrupt preferences entry: {0}")]
    Corrupt(String),
}

/// Encode persistent entries as a length-prefixed sequence of JSON-encoded
/// `(name, value)` records: `[u32 LE length][JSON bytes]` repeated.
pub fn encode_preferences(entries: &[(String, Value)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in entries {
        let entry = PreferenceEntry {
            name: name.clone(),
            value: value.clone(),
        };
        let json = serde_json::to_vec(&entry).expect("preference entries always serialize");
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&json);
    }
    out
}

/// Decode a buffer produced by [`encode_preferences`].
pub fn decode_preferences(buf: &[u8]) -> Result<Vec<(String, Value)>, PreferencesCodecError> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    while offset < buf.len() {
        if offset + 4 > buf.len() {
            return Err(PreferencesCodecError::Corrupt(
                "truncated length prefix".into(),
            ));
        }
        let len = u32::from_le_bytes(
            buf[offset..offset + 4]
                .try_into()
                .expect("slice of length 4"),
        ) as usize;
        offset += 4;
        if offset + len > buf.len() {
            return Err(PreferencesCodecError::Corrupt("truncated record".into()));
        }
        let entry: PreferenceEntry = serde_json::from_slice(&buf[offset..offset + len])
            .map_err(|e| PreferencesCodecError::Corrupt(e.to_string()))?;
        offset += len;
        out.push((entry.name, entry.value));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
