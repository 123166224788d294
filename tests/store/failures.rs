//! Failure Absorption Tests
//!
//! Backend errors and panics stay on the worker thread. Reads report a
//! miss, writes are dropped, and the worker keeps serving.

use crate::common::*;

#[test]
fn failed_read_reports_miss() {
    let store = faulty_store("data");
    store.set_item("ok", "1").unwrap();

    assert_eq!(store.get_item("poison").unwrap(), None);
    assert_eq!(store.get_item("ok").unwrap().as_deref(), Some("1"));
}

#[test]
fn failed_write_is_dropped() {
    let store = faulty_store("data");
    store.set_item("poison", "1").unwrap();
    store.set_item("ok", "2").unwrap();
    store.remove_item("poison").unwrap();

    assert_eq!(store.keys().unwrap(), vec!["ok"]);
    assert_eq!(store.get_length().unwrap(), 1);
}

#[test]
fn duplicate_rows_first_wins() {
    let store = faulty_store("data");
    assert_eq!(store.get_item("dup").unwrap().as_deref(), Some("first"));
    // Still served after the duplicate read.
    store.set_item("ok", "1").unwrap();
    assert_eq!(store.get_item("ok").unwrap().as_deref(), Some("1"));
}

#[test]
fn broken_table_reads_default() {
    let store = faulty_store("broken");
    store.set_item("a", "1").unwrap();

    assert_eq!(store.get_item("a").unwrap(), None);
    assert_eq!(store.get_key(0).unwrap(), None);
    assert_eq!(store.get_length().unwrap(), 0);
    assert!(store.keys().unwrap().is_empty());
    assert!(store.entries().unwrap().is_empty());
}

#[test]
fn worker_survives_panics() {
    let store = faulty_store("data");
    store.set_item("panic", "x").unwrap();
    assert_eq!(store.get_item("panic").unwrap(), None);

    store.set_item("after", "still here").unwrap();
    assert_eq!(
        store.get_item("after").unwrap().as_deref(),
        Some("still here")
    );
}

#[test]
fn metrics_count_failures() {
    let store = faulty_store("data");
    store.set_item("poison", "1").unwrap();
    store.set_item("panic", "1").unwrap();
    store.set_item("ok", "1").unwrap();
    let _ = store.get_item("poison").unwrap();
    store.flush().unwrap();

    let metrics = store.metrics().unwrap();
    assert_eq!(metrics.failed, 3);
    assert!(metrics.completed >= 1);
    assert!(metrics.submitted >= 5);
}

#[test]
fn destroy_after_failures_succeeds() {
    let store = faulty_store("data");
    store.set_item("poison", "1").unwrap();
    store.set_item("panic", "1").unwrap();
    store.destroy().unwrap();
    assert!(!store.is_initialized());
}
