// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disk persistence for `profile.preferences`. The wire codec itself
//! ([`rt_session::encode_preferences`] / [`decode_preferences`]) is pure;
//! this module owns the actual file I/O, keeping framing logic separate
//! from the read/write calls around it.

use rt_core::Value;
use rt_session::{decode_preferences, encode_preferences};
use std::io;
use std::path::Path;

/// Load persisted preferences from `path`. A missing file is treated as an
/// empty profile, falling back to defaults on absence.
pub fn load_preferences(path: &Path) -> io::Result<Vec<(String, Value)>> {
    match std::fs::read(path) {
        Ok(buf) => decode_preferences(&buf)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

/// Persist `entries` to `path`, creating parent directories as needed.
pub fn save_preferences(path: &Path, entries: &[(String, Value)]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, encode_preferences(entries))
}

#[cfg(test)]
#[path = "profile_io_tests.rs"]
mod tests;
