// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Root error taxonomy shared across the runtime crates.
//!
//! Every concrete error kind wraps [`Error`] so call sites can propagate with
//! `?` regardless of which crate raised it, mirroring the engine crate's
//! `RuntimeError::Execute(#[from] ExecuteError)` pattern.

use thiserror::Error;

/// Root error type for the application runtime.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Addon(#[from] AddonError),

    #[error("address parse error: {0}")]
    Address(String),
}

/// Engine bootstrap or tick-loop failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("tock declared without a tick action")]
    TockWithoutTick,

    #[error("engine is already running")]
    AlreadyRunning,

    #[error("service already registered at address {0}")]
    DuplicateService(String),

    #[error("cannot register a nil service")]
    NilService,

    #[error("service initialization failed: {0}")]
    InitFailed(String),

    #[error("tick action failed: {0}")]
    TickFailed(String),

    #[error("tock action failed: {0}")]
    TockFailed(String),

    #[error("event '{0}' already registered")]
    DuplicateEvent(String),
}

/// Service lifecycle (init/start/stop/tick) failure.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service {0} not found")]
    NotFound(String),

    #[error("service {name} init failed: {reason}")]
    InitFailed { name: String, reason: String },

    #[error("service {name} start failed: {reason}")]
    StartFailed { name: String, reason: String },

    #[error("service {name} stop failed: {reason}")]
    StopFailed { name: String, reason: String },

    #[error("service {name} tick failed: {reason}")]
    TickFailed { name: String, reason: String },

    #[error("service {0} is already running")]
    AlreadyRunning(String),

    #[error("service {0} has failed and cannot be started")]
    Failed(String),
}

/// Command wiring or argument validation failure.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("duplicate command name '{0}' under the same parent")]
    DuplicateName(String),

    #[error("command '{0}' has no Do action and no subcommands")]
    Empty(String),

    #[error("command '{name}' positional arg bounds are inconsistent: min {min} > max {max}")]
    InvalidArgBounds { name: String, min: usize, max: usize },

    #[error("command '{command}' flag '{flag}' shadows a parent flag")]
    ShadowedFlag { command: String, flag: String },

    #[error("command has no parent")]
    HasNoParent,

    #[error("expected between {min} and {max} positional arguments, got {got}")]
    ArgCountMismatch { min: usize, max: usize, got: usize },

    #[error("flag parse error: {0}")]
    Flags(String),
}

/// Options-store violation.
#[derive(Debug, Error)]
pub enum OptionError {
    #[error("invalid option key '{0}'")]
    InvalidKey(String),

    #[error("option key '{0}' already declared")]
    Duplicate(String),

    #[error("options store is sealed")]
    Sealed,

    #[error("options store is already sealed")]
    AlreadySealed,

    #[error("option key '{0}' is not accepted")]
    NotAccepted(String),

    #[error("option key '{0}' is read-only")]
    ReadOnly(String),

    #[error("option key '{0}' failed validation: {1}")]
    Validation(String, String),
}

/// Session state violation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session has been destroyed")]
    Destroyed,

    #[error("session write rejected for key '{0}': under the fs. prefix")]
    FsWriteRejected(String),

    #[error("api '{0}' is not registered")]
    UnknownApi(String),

    #[error("service loader timed out waiting for {0:?}")]
    LoaderTimeout(Vec<String>),

    #[error("service loader failed: unknown service {0}")]
    LoaderUnknownService(String),

    #[error("service loader failed: service {0} reported an error")]
    LoaderServiceFailed(String),
}

/// Addon wiring failure.
#[derive(Debug, Error)]
pub enum AddonError {
    #[error("addon '{0}' is already registered")]
    Duplicate(String),

    #[error("addon '{name}' registration failed: {reason}")]
    RegisterFailed { name: String, reason: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
