// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Addon`]: a self-contained bundle of commands, settings, options,
//! services, events and an optional API, attached to `Main` and wired by
//! the initializer's addon phase.

use crate::settings::SettingSpec;
use async_trait::async_trait;
use rt_command::Command;
use rt_core::AddonError;
use rt_engine::Service;
use rt_options::OptionSpec;
use rt_session::Session;
use std::any::Any;
use std::sync::Arc;

/// A self-contained bundle attached to `Main`. Every hook has a default
/// no-op/empty implementation so an addon only overrides what it needs.
#[async_trait]
pub trait Addon: Send + Sync {
    /// The addon's name; also the prefix its own options are merged under
    /// when the initializer merges them into the session options store.
    fn name(&self) -> &str;

    /// Commands appended to the root command tree.
    fn commands(&self) -> Vec<Command> {
        Vec::new()
    }

    /// This addon's settings group, extending the profile schema
    /// blueprint.
    fn settings(&self) -> Vec<SettingSpec> {
        Vec::new()
    }

    /// Options this addon declares under its own name prefix.
    fn options(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    /// Run once settings and options are finalized but before services are
    /// initialized. Skipped entirely for a command marked `skip_addons`.
    async fn register(&self, _session: Arc<Session>) -> Result<(), AddonError> {
        Ok(())
    }

    /// Services this addon contributes to the engine registry.
    fn services(&self) -> Vec<Arc<dyn Service>> {
        Vec::new()
    }

    /// Additional `(scope, key)` events this addon wants registered.
    fn events(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// A typed handle this addon publishes under a name, retrievable from
    /// the session's API registry.
    fn api(&self) -> Option<(String, Arc<dyn Any + Send + Sync>)> {
        None
    }
}

#[cfg(test)]
#[path = "addon_tests.rs"]
mod tests;
