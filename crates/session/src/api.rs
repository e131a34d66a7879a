// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session's typed API registry: addons publish a handle under a name,
//! retrievable and downcast by callers that know its concrete type.

use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct ApiRegistry {
    apis: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl ApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, api: Arc<dyn Any + Send + Sync>) {
        self.apis.write().insert(name.into(), api);
    }

    pub fn has(&self, name: &str) -> bool {
        self.apis.read().contains_key(name)
    }

    /// Fetch and downcast the API registered under `name`. Returns `None`
    /// if unregistered or registered under a different concrete type.
    pub fn get<T: 'static + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.apis
            .read()
            .get(name)
            .cloned()
            .and_then(|api| api.downcast::<T>().ok())
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
