// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::command::Command;
use crate::flag::Flag;
use rt_options::OptionsStore;
use std::sync::atomic::{AtomicUsize, Ordering};

fn test_session() -> Arc<Session> {
    Arc::new(Session::new("test-instance", OptionsStore::new()))
}

#[tokio::test]
async fn dispatch_runs_before_then_do_then_after_success() {
    let order = Arc::new(std::sync::Mutex::new(Vec::<&'static str>::new()));

    let before_order = order.clone();
    let do_order = order.clone();
    let success_order = order.clone();
    let always_order = order.clone();

    let root = Command::new("app").with_subcommand(
        Command::new("status")
            .with_before(Arc::new(move |_s, _a| {
                let order = before_order.clone();
                Box::pin(async move {
                    order.lock().unwrap().push("before");
                    Ok(())
                })
            }))
            .with_do(Arc::new(move |_s, _a| {
                let order = do_order.clone();
                Box::pin(async move {
                    order.lock().unwrap().push("do");
                    Ok(())
                })
            }))
            .with_after_success(Arc::new(move |_s, _a| {
                let order = success_order.clone();
                Box::pin(async move {
                    order.lock().unwrap().push("after_success");
                    Ok(())
                })
            }))
            .with_after_always(Arc::new(move |_s, _a, _err| {
                let order = always_order.clone();
                Box::pin(async move {
                    order.lock().unwrap().push("after_always");
                })
            })),
    );

    let dispatcher = Dispatcher::new(root).unwrap();
    let session = test_session();
    let stopped = Arc::new(AtomicUsize::new(0));
    let stopped_in_hook = stopped.clone();

    let exit_code = dispatcher
        .dispatch(
            session,
            vec!["app".to_string(), "status".to_string()],
            || async move {
                stopped_in_hook.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await
        .unwrap();

    assert_eq!(exit_code, 0);
    assert_eq!(stopped.load(Ordering::SeqCst), 1);
    assert_eq!(
        *order.lock().unwrap(),
        vec!["before", "do", "after_success", "after_always"]
    );
}

#[tokio::test]
async fn dispatch_runs_after_failure_when_do_errors() {
    let root = Command::new("app").with_subcommand(
        Command::new("status")
            .with_do(Arc::new(|_s, _a| {
                Box::pin(async { Err(CommandError::Flags("boom".into())) })
            }))
            .with_after_failure(Arc::new(|_s, _a, reason| {
                Box::pin(async move {
                    assert!(reason.contains("boom"));
                    Ok(())
                })
            })),
    );

    let dispatcher = Dispatcher::new(root).unwrap();
    let exit_code = dispatcher
        .dispatch(
            test_session(),
            vec!["app".to_string(), "status".to_string()],
            || async {},
        )
        .await
        .unwrap();

    assert_eq!(exit_code, 1);
}

#[tokio::test]
async fn dispatch_treats_user_initiated_termination_as_success() {
    let root = Command::new("app").with_subcommand(Command::new("status").with_do(Arc::new(
        |session: Arc<Session>, _a| {
            session.terminate(true);
            Box::pin(async { Err(CommandError::Flags("cancelled".into())) })
        },
    )));

    let dispatcher = Dispatcher::new(root).unwrap();
    let exit_code = dispatcher
        .dispatch(
            test_session(),
            vec!["app".to_string(), "status".to_string()],
            || async {},
        )
        .await
        .unwrap();

    assert_eq!(exit_code, 0);
}

#[tokio::test]
async fn dispatch_collects_flags_and_positionals_across_the_chain() {
    let root = Command::new("app")
        .with_flag(Flag::switch("debug").global())
        .with_subcommand(
            Command::new("show")
                .with_argn(1, 1)
                .with_flag(Flag::value("format").with_default("table"))
                .with_do(Arc::new(|_s, args: Arc<Args>| {
                    Box::pin(async move {
                        assert!(args.flag_bool("debug"));
                        assert_eq!(args.flag_str("format"), Some("table"));
                        assert_eq!(args.positional(0), Some("widget"));
                        Ok(())
                    })
                })),
        );

    let dispatcher = Dispatcher::new(root).unwrap();
    let exit_code = dispatcher
        .dispatch(
            test_session(),
            vec![
                "app".to_string(),
                "--debug".to_string(),
                "show".to_string(),
                "widget".to_string(),
            ],
            || async {},
        )
        .await
        .unwrap();

    assert_eq!(exit_code, 0);
}
