// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Main`]: the thin top-level façade. An application composes one
//! `Main` value — addons, commands, services, flags, options, settings,
//! migrations, and optional tick/tock callbacks — then calls [`Main::run`].
//! `Run` seals the configuration, hands it to [`rt_init::Initializer`],
//! and, once the initializer produces a ready session and engine, drives
//! the rest of the application's data flow: start the dispatcher,
//! initialize every service, signal readiness, run the selected command's
//! `Do` action, stop the engine, persist the profile if dirty, and return
//! an exit code.

use crate::signals;
use rt_command::{AlwaysHook, Command, FailureHook, Hook};
use rt_core::Value;
use rt_engine::{Service, TickFn, TockFn};
use rt_init::{Addon, InitConfig, Initializer, KeyMigration, Outcome, Paths, SettingSpec};
use rt_options::OptionSpec;
use rt_session::Session;
use std::sync::Arc;
use tracing::error;

fn noop_do() -> Hook {
    Arc::new(|_session, _args| Box::pin(async { Ok(()) }))
}

/// The top-level façade an application builds up and runs exactly once.
pub struct Main {
    app_name: String,
    app_slug: String,
    app_version: String,
    dev_build: bool,
    root_command: Command,
    addons: Vec<Arc<dyn Addon>>,
    services: Vec<Arc<dyn Service>>,
    option_specs: Vec<OptionSpec>,
    option_overrides: Vec<(String, Value)>,
    settings: Vec<SettingSpec>,
    migrations: Vec<KeyMigration>,
    tick: Option<TickFn>,
    tock: Option<TockFn>,
    argv: Vec<String>,
    sealed: bool,
}

impl Main {
    /// `app_slug` also names the filesystem layout under the OS user
    /// directories and is the host segment of every service address the
    /// engine registers.
    pub fn new(
        app_name: impl Into<String>,
        app_slug: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        let app_slug = app_slug.into();
        Self {
            app_name: app_name.into(),
            root_command: Command::new(app_slug.clone()),
            app_slug,
            app_version: app_version.into(),
            dev_build: false,
            addons: Vec::new(),
            services: Vec::new(),
            option_specs: Vec::new(),
            option_overrides: Vec::new(),
            settings: Vec::new(),
            migrations: Vec::new(),
            tick: None,
            tock: None,
            argv: Vec::new(),
            sealed: false,
        }
    }

    /// Marks this build as a development build: the default profile is
    /// named `default-devel` instead of `default`.
    pub fn with_dev_build(mut self, dev_build: bool) -> Self {
        self.dev_build = dev_build;
        self
    }

    /// The root command's `Do` action, run when no subcommand is selected.
    pub fn with_do(mut self, hook: Hook) -> Self {
        let root = self.root_command;
        self.root_command = root.with_do(hook);
        self
    }

    pub fn with_before(mut self, hook: Hook) -> Self {
        let root = self.root_command;
        self.root_command = root.with_before(hook);
        self
    }

    pub fn with_after_success(mut self, hook: Hook) -> Self {
        let root = self.root_command;
        self.root_command = root.with_after_success(hook);
        self
    }

    pub fn with_after_failure(mut self, hook: FailureHook) -> Self {
        let root = self.root_command;
        self.root_command = root.with_after_failure(hook);
        self
    }

    pub fn with_after_always(mut self, hook: AlwaysHook) -> Self {
        let root = self.root_command;
        self.root_command = root.with_after_always(hook);
        self
    }

    /// Append a subcommand to the root command tree; addon-contributed
    /// commands are appended separately during initialization.
    pub fn with_command(mut self, command: Command) -> Self {
        let root = self.root_command;
        self.root_command = root.with_subcommand(command);
        self
    }

    pub fn with_addon(mut self, addon: Arc<dyn Addon>) -> Self {
        self.addons.push(addon);
        self
    }

    pub fn with_service(mut self, service: Arc<dyn Service>) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_option(mut self, spec: OptionSpec) -> Self {
        self.option_specs.push(spec);
        self
    }

    /// A user-provided option override, applied during phase 3 if the key
    /// is declared (warned about otherwise, phase 12).
    pub fn with_option_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.option_overrides.push((key.into(), value.into()));
        self
    }

    pub fn with_setting(mut self, spec: SettingSpec) -> Self {
        self.settings.push(spec);
        self
    }

    pub fn with_migration(mut self, migration: KeyMigration) -> Self {
        self.migrations.push(migration);
        self
    }

    pub fn with_tick(mut self, tick: TickFn) -> Self {
        self.tick = Some(tick);
        self
    }

    pub fn with_tock(mut self, tock: TockFn) -> Self {
        self.tock = Some(tock);
        self
    }

    /// Override the process argv. Defaults to `std::env::args()` if never
    /// called — tests use this to drive deterministic scenarios.
    pub fn with_argv(mut self, argv: Vec<String>) -> Self {
        self.argv = argv;
        self
    }

    /// Run exactly once: seal, initialize, drive the engine through one
    /// command invocation, and return the process exit code. A second call
    /// on an already-sealed `Main` logs an error and returns without side
    /// effects.
    pub async fn run(&mut self) -> i32 {
        if self.sealed {
            error!("Main::run called more than once; ignoring");
            return 1;
        }
        self.sealed = true;

        let mut root = std::mem::replace(&mut self.root_command, Command::new(""));
        if !root.has_do() && root.subcommands().is_empty() {
            root = root.with_do(noop_do());
        }

        let argv = if self.argv.is_empty() {
            std::env::args().collect()
        } else {
            std::mem::take(&mut self.argv)
        };

        let config = InitConfig {
            app_name: self.app_name.clone(),
            app_slug: self.app_slug.clone(),
            app_version: self.app_version.clone(),
            dev_build: self.dev_build,
            root_command: root,
            addons: std::mem::take(&mut self.addons),
            services: std::mem::take(&mut self.services),
            option_specs: std::mem::take(&mut self.option_specs),
            option_overrides: std::mem::take(&mut self.option_overrides),
            settings: std::mem::take(&mut self.settings),
            migrations: std::mem::take(&mut self.migrations),
            tick: self.tick.take(),
            tock: self.tock.take(),
            argv,
        };

        match Initializer::run(config).await {
            Ok(Outcome::ExitEarly(code)) => code,
            Ok(Outcome::Ready(state)) => Self::drive(*state).await,
            Err(err) => {
                error!(error = %err, "initialization failed");
                1
            }
        }
    }

    /// Drives a ready session/engine pair from here onward: start the
    /// engine (dispatcher + service init + readiness), run the selected
    /// command, stop the engine, persist the profile if dirty, and
    /// destroy the session.
    async fn drive(state: rt_init::ReadyState) -> i32 {
        let rt_init::ReadyState {
            session,
            engine,
            dispatcher,
            argv,
            paths,
            exit_guard,
            ..
        } = state;

        let signal_task = signals::spawn(session.clone());

        if let Err(err) = engine.start(session.clone()).await {
            error!(error = %err, "engine failed to start");
            Self::finish(&session, &paths);
            signal_task.abort();
            drop(exit_guard);
            return 1;
        }

        session.ready().await;

        let exit_code = {
            let stop_session = session.clone();
            let stop_engine = engine.clone();
            match dispatcher
                .dispatch(session.clone(), argv, move || async move {
                    stop_engine.stop(stop_session).await;
                })
                .await
            {
                Ok(code) => code,
                Err(err) => {
                    error!(error = %err, "command dispatch failed");
                    engine.stop(session.clone()).await;
                    1
                }
            }
        };

        Self::finish(&session, &paths);
        signal_task.abort();
        drop(exit_guard);
        exit_code
    }

    /// Persist the profile if dirty — only the exit hook writes the
    /// profile file — then destroy the session.
    fn finish(session: &Session, paths: &Paths) {
        if session.profile().is_dirty() {
            let entries = session.profile().persistent_entries();
            match rt_init::save_preferences(&paths.profile_preferences_path(), &entries) {
                Ok(()) => session.profile().mark_clean(),
                Err(err) => error!(error = %err, "failed to persist profile"),
            }
        }
        session.destroy(None);
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
