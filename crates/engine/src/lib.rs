// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rt-engine: the cooperative scheduler, service containers, cron
//! wrapper, and the built-in stats service.

pub mod builtin;
pub mod container;
pub mod cron;
pub mod dispatcher;
pub mod engine;
pub mod service;

pub use container::ServiceContainer;
pub use cron::{Cron, CronFuture, CronJob};
pub use engine::{Engine, TickFn, TockFn};
pub use service::{Listener, Service};
