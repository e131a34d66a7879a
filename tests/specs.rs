// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios driving the whole runtime stack through its public
//! `rt::Main` surface: a real initializer boot, a real engine tick loop,
//! real service containers, against a temporary filesystem layout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rt::{Address, CommandError, Main, Service, SessionError, Session, Value};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn with_isolated_env<F, Fut, T>(f: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    let root = tempfile::tempdir().unwrap();
    std::env::set_var("HOME", root.path());
    std::env::set_var("XDG_CACHE_HOME", root.path().join("cache"));
    std::env::set_var("XDG_CONFIG_HOME", root.path().join("config"));
    let result = f().await;
    std::env::remove_var("HOME");
    std::env::remove_var("XDG_CACHE_HOME");
    std::env::remove_var("XDG_CONFIG_HOME");
    result
}

fn app(argv: Vec<&str>) -> Main {
    Main::new("specsapp", "specsapp", "9.9.9")
        .with_argv(argv.into_iter().map(str::to_string).collect())
        .with_option_override("app.engine.throttle_ticks", Value::Int(20))
}

/// Records every `services.service.started`/`services.service.stopped`
/// event it sees, and counts its own ticks.
struct TrackingService {
    name: String,
    autostart: bool,
    ticks: Arc<AtomicU32>,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Service for TrackingService {
    fn name(&self) -> &str {
        &self.name
    }

    fn autostart(&self) -> bool {
        self.autostart
    }

    fn has_tick(&self) -> bool {
        true
    }

    async fn tick(
        &self,
        _session: Arc<Session>,
        _at: DateTime<Utc>,
        _delta: Duration,
    ) -> Result<(), rt::ServiceError> {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn listeners(&self) -> Vec<(String, rt_engine::Listener)> {
        let log = self.log.clone();
        let started = log.clone();
        let stopped = log;
        vec![
            (
                "services.service.started".to_string(),
                Arc::new(move |event| {
                    if let Some(Value::String(addr)) = event.payload.get("address") {
                        started.lock().unwrap().push(format!("started:{addr}"));
                    }
                    Ok(())
                }),
            ),
            (
                "services.service.stopped".to_string(),
                Arc::new(move |event| {
                    if let Some(Value::String(addr)) = event.payload.get("address") {
                        stopped.lock().unwrap().push(format!("stopped:{addr}"));
                    }
                    Ok(())
                }),
            ),
        ]
    }
}

#[tokio::test]
#[serial_test::serial(rt_init_env)]
async fn no_op_app_ticks_and_exits_cleanly() {
    with_isolated_env(|| async {
        let ticks = Arc::new(AtomicU32::new(0));
        let tick_count = ticks.clone();
        let mut main = app(vec!["specsapp"]).with_tick(Arc::new(move |_session, _at, _delta| {
            let ticks = tick_count.clone();
            Box::pin(async move {
                ticks.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }));
        assert_eq!(main.run().await, 0);
        assert!(ticks.load(Ordering::SeqCst) >= 1);
    })
    .await;
}

#[tokio::test]
#[serial_test::serial(rt_init_env)]
async fn a_tick_error_on_the_first_iteration_still_reaches_ready_and_do() {
    // A tick that always errors must not wedge `Ready` forever: the
    // facade awaits `session.ready()` before running `Do`, so if the tick
    // loop's first (and only) iteration fails without marking ready, this
    // test hangs instead of completing.
    with_isolated_env(|| async {
        let do_ran = Arc::new(AtomicBool::new(false));
        let flag = do_ran.clone();
        let mut main = app(vec!["specsapp"])
            .with_tick(Arc::new(|_session, _at, _delta| {
                Box::pin(async { Err(rt::EngineError::TickFailed("boom".into())) })
            }))
            .with_do(Arc::new(move |_session, _args| {
                let flag = flag.clone();
                Box::pin(async move {
                    flag.store(true, Ordering::SeqCst);
                    Err(CommandError::Flags("tick never succeeded".into()))
                })
            }));
        let exit_code = tokio::time::timeout(Duration::from_secs(5), main.run())
            .await
            .expect("a failing tick must not deadlock Main::run");
        assert_eq!(exit_code, 1);
        assert!(do_ran.load(Ordering::SeqCst));
    })
    .await;
}

#[tokio::test]
#[serial_test::serial(rt_init_env)]
async fn service_lifecycle_emits_started_then_stopped_around_ticks() {
    with_isolated_env(|| async {
        let ticks = Arc::new(AtomicU32::new(0));
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = Arc::new(TrackingService {
            name: "worker".to_string(),
            autostart: true,
            ticks: ticks.clone(),
            log: log.clone(),
        });

        let mut main = app(vec!["specsapp"])
            .with_service(service)
            .with_do(Arc::new(|_session, _args| {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(120)).await;
                    Ok(())
                })
            }));
        assert_eq!(main.run().await, 0);

        assert!(ticks.load(Ordering::SeqCst) > 0, "service should have ticked");
        let events = log.lock().unwrap().clone();
        let started_at = events.iter().position(|e| e.starts_with("started:"));
        let stopped_at = events.iter().position(|e| e.starts_with("stopped:"));
        match (started_at, stopped_at) {
            (Some(s), Some(p)) => assert!(s < p, "started must precede stopped: {events:?}"),
            other => panic!("expected both started and stopped events, got {other:?}: {events:?}"),
        }
    })
    .await;
}

#[tokio::test]
#[serial_test::serial(rt_init_env)]
async fn service_loader_resolves_once_a_non_autostart_service_is_requested() {
    with_isolated_env(|| async {
        let service = Arc::new(TrackingService {
            name: "deferred".to_string(),
            autostart: false,
            ticks: Arc::new(AtomicU32::new(0)),
            log: Arc::new(Mutex::new(Vec::new())),
        });

        let mut main = app(vec!["specsapp"])
            .with_service(service)
            .with_do(Arc::new(|session, _args| {
                Box::pin(async move {
                    let addr: Address = format!("{}/service/deferred", session.instance())
                        .parse()
                        .map_err(|_| CommandError::Flags("bad address".into()))?;
                    rt::ServiceLoader::new(&session, vec![addr.clone()])
                        .wait()
                        .await
                        .map_err(|e| CommandError::Flags(e.to_string()))?;
                    let info = session.service_info(&addr).expect("service info recorded");
                    if !info.running {
                        return Err(CommandError::Flags("expected service to be running".into()));
                    }
                    Ok(())
                })
            }));
        assert_eq!(main.run().await, 0);
    })
    .await;
}

#[tokio::test]
#[serial_test::serial(rt_init_env)]
async fn service_loader_times_out_on_a_service_that_never_appears() {
    with_isolated_env(|| async {
        let observed = Arc::new(Mutex::new(String::new()));
        let observed_clone = observed.clone();
        let mut main = app(vec!["specsapp"])
            .with_option_override("app.service_loader.timeout", Value::Int(200))
            .with_do(Arc::new(move |session, _args| {
                let observed = observed_clone.clone();
                Box::pin(async move {
                    let addr: Address = format!("{}/service/ghost", session.instance())
                        .parse()
                        .map_err(|_| CommandError::Flags("bad address".into()))?;
                    let result = rt::ServiceLoader::new(&session, vec![addr]).wait().await;
                    match result {
                        Err(SessionError::LoaderTimeout(_)) => {
                            *observed.lock().unwrap() = "timeout".to_string();
                            Ok(())
                        }
                        other => {
                            *observed.lock().unwrap() = format!("{other:?}");
                            Ok(())
                        }
                    }
                })
            }));
        assert_eq!(main.run().await, 0);
        assert_eq!(*observed.lock().unwrap(), "timeout");
    })
    .await;
}

#[tokio::test]
#[serial_test::serial(rt_init_env)]
async fn a_persistent_setting_survives_a_second_run_and_firstuse_flips() {
    with_isolated_env(|| async {
        let firstuse_seen = Arc::new(Mutex::new(false));
        let seen_clone = firstuse_seen.clone();
        let mut first = app(vec!["specsapp"]).with_do(Arc::new(move |session, _args| {
            let seen = seen_clone.clone();
            Box::pin(async move {
                *seen.lock().unwrap() = session.opts().get("app.firstuse") == Value::Bool(true);
                session
                    .profile()
                    .set("greeting", Value::String("so long".to_string()));
                Ok(())
            })
        }));
        assert_eq!(first.run().await, 0);
        assert!(*firstuse_seen.lock().unwrap(), "first run should see app.firstuse=true");

        let second_firstuse = Arc::new(Mutex::new(true));
        let second_firstuse_clone = second_firstuse.clone();
        let second_seen = Arc::new(Mutex::new(Value::Null));
        let second_seen_clone = second_seen.clone();
        let mut second = app(vec!["specsapp"])
            .with_setting(rt::SettingSpec::new("greeting", "hello").persistent())
            .with_do(Arc::new(move |session, _args| {
                let firstuse = second_firstuse_clone.clone();
                let seen = second_seen_clone.clone();
                Box::pin(async move {
                    *firstuse.lock().unwrap() = session.opts().get("app.firstuse") == Value::Bool(true);
                    *seen.lock().unwrap() = session.setting("greeting");
                    Ok(())
                })
            }));
        assert_eq!(second.run().await, 0);
        assert!(!*second_firstuse.lock().unwrap(), "second run should see app.firstuse=false");
        assert_eq!(
            *second_seen.lock().unwrap(),
            Value::String("so long".to_string())
        );
    })
    .await;
}
