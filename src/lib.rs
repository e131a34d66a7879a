// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `rt`: the application runtime core. An application composes
//! a [`Main`] value by registering addons, commands, services, options,
//! settings and optional tick/tock callbacks, then calls [`Main::run`].
//! `Main` seals itself, hands off to [`rt_init::Initializer`], and drives
//! the resulting [`rt_engine::Engine`]/[`rt_session::Session`] pair through
//! one command invocation before persisting the profile and exiting.

mod facade;
mod signals;

pub use facade::Main;

// Re-exported so a downstream application only depends on this crate.
pub use rt_command::{AlwaysHook, Command, FailureHook, Hook, HookResult, Usage};
pub use rt_core::{
    AddonError, Address, CommandError, EngineError, Error, Event, OptionError, ServiceError,
    SessionError, Value,
};
pub use rt_engine::{Service, TickFn, TockFn};
pub use rt_init::{Addon, KeyMigration, SettingSpec};
pub use rt_options::{Kind, OptionSpec};
pub use rt_session::{Profile, ServiceLoader, Session};
