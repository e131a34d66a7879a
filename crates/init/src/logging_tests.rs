use super::*;

#[test]
fn queued_logger_buffers_in_order() {
    let queued = QueuedLogger::new();
    queued.info("a", "first");
    queued.warn("b", "second");
    let drained = queued.drain();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].level, QueuedLevel::Info);
    assert_eq!(drained[0].target, "a");
    assert_eq!(drained[1].level, QueuedLevel::Warn);
}

#[test]
fn drain_empties_the_queue() {
    let queued = QueuedLogger::new();
    queued.debug("x", "line");
    assert_eq!(queued.drain().len(), 1);
    assert!(queued.drain().is_empty());
}

#[test]
fn clone_shares_the_same_buffer() {
    let queued = QueuedLogger::new();
    let handle = queued.clone();
    handle.error("x", "boom");
    assert_eq!(queued.drain().len(), 1);
}

#[test]
#[serial_test::serial(rt_init_logging)]
fn install_is_idempotent_across_the_process() {
    let first = install("info");
    let second = install("debug");
    assert!(first.set_level("debug").is_ok());
    assert!(second.set_level("info").is_ok());
}

#[test]
#[serial_test::serial(rt_init_logging)]
fn replay_drains_the_queue() {
    let queued = QueuedLogger::new();
    queued.info("boot", "starting up");
    let _handle = install("info");
    replay(&queued);
    assert!(queued.drain().is_empty());
}
