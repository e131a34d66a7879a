// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance slug and address resolution.

use rt_core::{Address, IdGen};

/// One running instance of the application: its slug (used for the
/// filesystem layout), a generated instance id (used for the tmp
/// directory suffix and PID filename), and its resolved [`Address`].
#[derive(Debug, Clone)]
pub struct Instance {
    pub slug: String,
    pub id: String,
    pub address: Address,
}

impl Instance {
    /// Resolve the instance's slug and address under `host`, generating a
    /// fresh instance id with `id_gen`.
    pub fn new(slug: impl Into<String>, host: impl Into<String>, id_gen: &dyn IdGen) -> Self {
        let slug = slug.into();
        let id = id_gen.next();
        let address = Address::instance(host, id.clone());
        Self { slug, id, address }
    }
}

/// Best-effort local host identifier for the instance address, falling
/// back to `"localhost"` when the environment exposes none of the usual
/// hostname variables.
pub fn local_host() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
