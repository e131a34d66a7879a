// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Initializer::run`]: the ordered, one-shot bootstrap. Composes
//! configuration from defaults, addon contributions and user overrides,
//! resolves filesystem paths, loads the persisted profile, wires
//! addons/services/commands, and returns a ready-to-use session and
//! engine (or an early-exit sentinel for `--version`/`--help`) without
//! itself starting the engine — that handoff belongs to the `Main` façade.
//!
//! Instance resolution runs before session/engine construction rather than
//! after, unlike the order these phases are usually described in: `Engine::new`
//! needs the instance's host address up front. Nothing observable about
//! boot order changes: no addon, service, or command runs before either
//! value exists.

use crate::addon::Addon;
use crate::exit_guard::ExitGuard;
use crate::instance::{self, Instance};
use crate::logging::{self, LoggingHandle, QueuedLogger};
use crate::migration::{KeyMigration, MigrationRegistry};
use crate::paths::Paths;
use crate::profile_io;
use crate::settings::SettingSpec;
use rt_command::{Command, Dispatcher, Flag};
use rt_core::{Error, OptionError, UuidIdGen, Value};
use rt_engine::{Engine, Service, TickFn, TockFn};
use rt_options::{Kind, OptionSpec, Options};
use rt_session::Session;
use std::sync::Arc;

/// Legacy duration key kept for backward compatibility; migrated to the
/// canonical `app.engine.throttle_ticks` form at profile load.
const LEGACY_THROTTLE_KEY: &str = "app.throttle.ticks";
const THROTTLE_KEY: &str = "app.engine.throttle_ticks";

/// Everything `Main` assembles before calling [`Initializer::run`]: its
/// own identity, root command, registered addons/services, option and
/// settings declarations, the tick/tock callbacks, and the raw process
/// arguments.
pub struct InitConfig {
    pub app_name: String,
    pub app_slug: String,
    pub app_version: String,
    pub dev_build: bool,
    pub root_command: Command,
    pub addons: Vec<Arc<dyn Addon>>,
    pub services: Vec<Arc<dyn Service>>,
    pub option_specs: Vec<OptionSpec>,
    pub option_overrides: Vec<(String, Value)>,
    pub settings: Vec<SettingSpec>,
    pub migrations: Vec<KeyMigration>,
    pub tick: Option<TickFn>,
    pub tock: Option<TockFn>,
    pub argv: Vec<String>,
}

/// Everything `Main` needs once the initializer has released control.
pub struct ReadyState {
    pub session: Arc<Session>,
    pub engine: Arc<Engine>,
    pub dispatcher: Dispatcher,
    pub argv: Vec<String>,
    pub logging: LoggingHandle,
    pub paths: Paths,
    pub instance: Instance,
    pub exit_guard: ExitGuard,
}

/// What the initializer produced: either a value ready for the engine to
/// drive, or the sentinel for an early, successful exit (`--version`,
/// `--help`).
pub enum Outcome {
    ExitEarly(i32),
    Ready(Box<ReadyState>),
}

pub struct Initializer;

impl Initializer {
    /// Run every bootstrap phase in order, returning once the
    /// session and engine are ready for `Main` to hand off to — or the
    /// early-exit sentinel if `--version`/`--help` was requested.
    pub async fn run(config: InitConfig) -> Result<Outcome, Error> {
        let InitConfig {
            app_name,
            app_slug,
            app_version,
            dev_build,
            root_command,
            addons,
            services,
            option_specs,
            option_overrides,
            settings,
            migrations: extra_migrations,
            tick,
            tock,
            argv,
        } = config;

        let queued = QueuedLogger::new();
        queued.info("rt-init", "booting");

        // Declare the reserved root flags on the application's root command,
        // append each addon's commands, then verify and parse argv against
        // the tree.
        let mut root = root_command;
        for addon in &addons {
            for cmd in addon.commands() {
                root = root.with_subcommand(cmd);
            }
        }
        root = declare_root_flags(root);

        let dispatcher = Dispatcher::new(root)?;
        let leaf = dispatcher.leaf_info(&argv)?;

        // version/help short-circuit. CLI help rendering/styling is left to
        // the application; this prints the unstyled minimum needed to
        // satisfy the early-exit contract.
        if leaf.args.flag_bool("version") {
            println!("{app_name} {app_version}");
            return Ok(Outcome::ExitEarly(0));
        }
        if leaf.args.flag_bool("help") {
            render_help(&dispatcher, &app_name, &app_version);
            return Ok(Outcome::ExitEarly(0));
        }

        let default_level = if leaf.args.flag_bool("system-debug") {
            "trace"
        } else if leaf.args.flag_bool("debug") || leaf.args.flag_bool("verbose") {
            "debug"
        } else {
            "info"
        };

        // Resolve the instance slug/address ahead of session/engine
        // construction; see module docs.
        let id_gen = UuidIdGen;
        let host = instance::local_host();
        let instance = Instance::new(&app_slug, host, &id_gen);

        let profile_flag = leaf.args.flag_str("profile").map(str::to_string);
        let profile_name = match profile_flag {
            Some(name) if name != "default" => name,
            _ if dev_build => "default-devel".to_string(),
            _ => "default".to_string(),
        };

        // Resolve and create the filesystem layout, and register the
        // deferred exit hook that removes the tmp dir + PID file.
        let paths = Paths::resolve(&app_slug, &profile_name, &instance.id)
            .map_err(|e| tap_io_error("failed to resolve filesystem paths", &e))?;
        let exit_guard = ExitGuard::new(paths.tmp.clone(), paths.pid_file.clone());

        // Construct session/engine and apply option defaults + overrides.
        // The `app` owner is sealed only after the addon wiring loop below,
        // since `merge_prefixed` declares each addon's keys onto this same
        // owner and a sealed `Options` refuses new declarations.
        let mut options_store = rt_options::OptionsStore::new();
        let mut pending_overrides = Vec::new();
        {
            let app = options_store.owner_mut("app");
            declare_default_app_options(app, &app_version, &app_name)?;
            for spec in option_specs {
                app.declare(spec)?;
            }
            set_path_options(app, &paths)?;

            for (key, value) in option_overrides {
                if app.accepts(&key) {
                    app.set(&key, value)?;
                } else {
                    pending_overrides.push(key);
                }
            }
            // Warn about overrides that named a key nothing in this
            // process (not even an addon, since addons declare their own
            // options under their own prefix, not the `app` owner) ever
            // accepts.
            for key in pending_overrides {
                queued.warn("rt-init", format!("unrecognized option override: {key}"));
            }
        }

        let event_channel_capacity = match options_store.get("app.session.event_channel_capacity") {
            Value::Int(n) if n > 0 => n as usize,
            _ => 100,
        };
        let session = Arc::new(
            Session::with_event_capacity(
                instance.address.to_string(),
                options_store,
                event_channel_capacity,
            )
            .with_profile_name(profile_name),
        );

        let mut engine_builder = Engine::new(instance.address.clone());
        if let Some(tick) = tick {
            engine_builder = engine_builder.with_tick(tick);
        }
        if let Some(tock) = tock {
            engine_builder = engine_builder.with_tock(tock);
        }
        let engine = Arc::new(engine_builder);

        // Install the real subscriber and drain everything logged before
        // it existed.
        let logging = logging::install(default_level);
        logging::replay(&queued);

        // Register the built-in service-lifecycle events, plus the
        // engine's own tick/tock error events — every scope.key the
        // dispatcher or tick loop may ever emit must be pre-registered or
        // it is silently dropped.
        engine.register_event("services", "start.services")?;
        engine.register_event("services", "stop.services")?;
        engine.register_event("services", "service.started")?;
        engine.register_event("services", "service.stopped")?;
        engine.register_event("engine", "app.tick.err")?;
        engine.register_event("engine", "app.tock.err")?;

        // Load + migrate the persisted profile, declare the settings
        // blueprint (app + every addon's settings group), and materialize
        // the persistent entries found on disk.
        let mut migrations = MigrationRegistry::new();
        migrations.register(KeyMigration::new(LEGACY_THROTTLE_KEY, THROTTLE_KEY));
        migrations.extend(extra_migrations);

        for spec in &settings {
            session
                .profile()
                .declare(spec.key.clone(), spec.default.clone(), spec.persistent);
        }
        for addon in &addons {
            for spec in addon.settings() {
                session.profile().declare(spec.key, spec.default, spec.persistent);
            }
        }

        let prefs_path = paths.profile_preferences_path();
        let raw_entries = profile_io::load_preferences(&prefs_path)
            .map_err(|e| tap_io_error("failed to load persisted preferences", &e))?;
        session
            .profile()
            .load_persistent(migrations.apply(raw_entries));

        // Main's own (non-addon) services.
        for service in services {
            engine.register_service(&session, service)?;
        }

        // For each addon: construct its options store, merge it under its
        // own name prefix, run its register action (unless the active
        // command opts out), and wire its services/events/API.
        for addon in &addons {
            let mut addon_options = Options::new(addon.name());
            for spec in addon.options() {
                addon_options.declare(spec)?;
            }
            addon_options.seal()?;
            session
                .opts_mut()
                .merge_prefixed("app", addon.name(), &addon_options);

            if !leaf.skip_addons {
                addon.register(session.clone()).await?;
            }

            for service in addon.services() {
                engine.register_service(&session, service)?;
            }
            for (scope, key) in addon.events() {
                engine.register_event(&scope, &key)?;
            }
            if let Some((name, api)) = addon.api() {
                session.apis().register(name, api);
            }
        }

        session.opts_mut().owner_mut("app").seal().or_else(|err| match err {
            rt_core::OptionError::AlreadySealed => Ok(()),
            other => Err(other),
        })?;

        Ok(Outcome::Ready(Box::new(ReadyState {
            session,
            engine,
            dispatcher,
            argv,
            logging,
            paths,
            instance,
            exit_guard,
        })))
    }
}

fn declare_root_flags(root: Command) -> Command {
    root.with_flag(Flag::switch("version").global())
        .with_flag(Flag::switch("x").global())
        .with_flag(Flag::switch("system-debug").global())
        .with_flag(Flag::switch("debug").global())
        .with_flag(Flag::switch("verbose").with_short('v').global())
        .with_flag(Flag::switch("help").with_short('h').global())
        .with_flag(
            Flag::value("profile")
                .with_default("default")
                .global(),
        )
}

fn render_help(dispatcher: &Dispatcher, app_name: &str, app_version: &str) {
    println!("{app_name} {app_version}");
    for sub in dispatcher.root().subcommands() {
        println!("  {}  {}", sub.name(), "");
    }
}

fn declare_default_app_options(
    app: &mut Options,
    app_version: &str,
    app_name: &str,
) -> Result<(), OptionError> {
    app.declare(
        OptionSpec::new(THROTTLE_KEY, Value::Int(1000), Kind::RUNTIME)
            .with_description("application tick/tock interval in milliseconds")
            .with_validator(|v| match v {
                Value::Int(ms) if *ms > 0 => Ok(()),
                _ => Err("must be a positive integer number of milliseconds".to_string()),
            }),
    )?;
    app.declare(
        OptionSpec::new("app.engine.stats_service", Value::Bool(true), Kind::RUNTIME)
            .with_description("whether the engine registers its built-in stats service"),
    )?;
    app.declare(
        OptionSpec::new("app.cron.on.service.start", Value::Bool(false), Kind::RUNTIME)
            .with_description("run every cron job once immediately when its service starts"),
    )?;
    app.declare(
        OptionSpec::new(
            "app.service_loader.timeout",
            Value::Int(30_000),
            Kind::RUNTIME,
        )
        .with_description("ServiceLoader poll timeout in milliseconds"),
    )?;
    app.declare(
        OptionSpec::new(
            "app.service_loader.poll_interval",
            Value::Int(100),
            Kind::RUNTIME,
        )
        .with_description("ServiceLoader poll interval in milliseconds"),
    )?;
    app.declare(
        OptionSpec::new(
            "app.session.event_channel_capacity",
            Value::Int(100),
            Kind::RUNTIME | Kind::READ_ONLY,
        )
        .with_description("session event channel capacity, fixed at session construction"),
    )?;
    app.declare(
        OptionSpec::new("app.firstuse", Value::Bool(false), Kind::RUNTIME)
            .with_description("true if the config directory was just created this run"),
    )?;
    app.declare(
        OptionSpec::new(
            "app.version",
            Value::String(app_version.to_string()),
            Kind::CONFIG | Kind::READ_ONLY,
        )
        .with_description("application version"),
    )?;
    app.declare(
        OptionSpec::new(
            "app.module",
            Value::String(app_name.to_string()),
            Kind::CONFIG | Kind::READ_ONLY,
        )
        .with_description("application module/package identifier"),
    )?;
    for key in [
        "app.fs.path.pwd",
        "app.fs.path.home",
        "app.fs.path.tmp",
        "app.fs.path.cache",
        "app.fs.path.config",
    ] {
        app.declare(
            OptionSpec::new(key, Value::Null, Kind::CONFIG | Kind::READ_ONLY)
                .with_description("resolved filesystem path"),
        )?;
    }
    Ok(())
}

fn set_path_options(app: &mut Options, paths: &Paths) -> Result<(), OptionError> {
    app.set("app.fs.path.pwd", path_value(&paths.pwd))?;
    app.set("app.fs.path.home", path_value(&paths.home))?;
    app.set("app.fs.path.tmp", path_value(&paths.tmp))?;
    app.set("app.fs.path.cache", path_value(&paths.cache))?;
    app.set("app.fs.path.config", path_value(&paths.config))?;
    app.set("app.firstuse", Value::Bool(paths.first_use))?;
    Ok(())
}

fn path_value(path: &std::path::Path) -> Value {
    Value::String(path.display().to_string())
}

fn tap_io_error(context: &str, err: &std::io::Error) -> Error {
    tracing::warn!(error = %err, "{context}");
    rt_core::SessionError::Destroyed.into()
}

#[cfg(test)]
#[path = "initializer_tests.rs"]
mod tests;
