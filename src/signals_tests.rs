use super::*;
use rt_options::OptionsStore;
use rt_session::Session;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn session() -> Arc<Session> {
    Arc::new(Session::new("test-instance", OptionsStore::new()))
}

#[test]
fn first_signal_requests_graceful_terminate_when_allowed() {
    let session = session();
    let received_once = AtomicBool::new(false);
    handle_signal(&session, &received_once, "SIGINT");
    assert!(session.is_terminated());
    assert!(!session.is_disposed());
}

#[test]
fn first_signal_destroys_immediately_when_user_cancel_disallowed() {
    let session = session();
    session.set_allow_user_cancel(false);
    let received_once = AtomicBool::new(false);
    handle_signal(&session, &received_once, "SIGTERM");
    assert!(session.is_disposed());
}

#[test]
fn second_signal_always_forces_kill() {
    let session = session();
    let received_once = AtomicBool::new(false);
    handle_signal(&session, &received_once, "SIGINT");
    assert!(!session.is_disposed());
    handle_signal(&session, &received_once, "SIGINT");
    assert!(session.is_disposed());
}
