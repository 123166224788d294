//! Concurrency Tests
//!
//! Many caller threads against one worker.

use crate::common::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 100;

#[test]
fn concurrent_writers_all_land() {
    let test = TestStore::new();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for t in 0..THREADS {
            let store = &test.store;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    store.set_item(format!("t{}-{}", t, i), i.to_string()).unwrap();
                }
            });
        }
    });

    assert_eq!(test.store.get_length().unwrap(), THREADS * PER_THREAD);
}

#[test]
fn per_thread_order_is_preserved() {
    let test = TestStore::new();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for t in 0..THREADS {
            let store = &test.store;
            let barrier = &barrier;
            s.spawn(move || {
                let key = format!("t{}", t);
                barrier.wait();
                for i in 0..PER_THREAD {
                    store.set_item(key.clone(), i.to_string()).unwrap();
                }
            });
        }
    });

    for t in 0..THREADS {
        let value = test.store.get_item(&format!("t{}", t)).unwrap();
        assert_eq!(value, Some((PER_THREAD - 1).to_string()));
    }
}

#[test]
fn reader_sees_own_writes() {
    let test = TestStore::new();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for t in 0..THREADS {
            let store = &test.store;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for i in 0..20 {
                    let key = format!("t{}-{}", t, i);
                    store.set_item(key.clone(), "v").unwrap();
                    assert_eq!(store.get_item(&key).unwrap().as_deref(), Some("v"));
                }
            });
        }
    });
}

#[test]
fn shared_store_through_arc() {
    let store = Arc::new(memory_store());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    store.set_item(format!("{}:{}", t, i), "v").unwrap();
                    let _ = store.get_length().unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get_length().unwrap(), THREADS * PER_THREAD);
}

/// Writers hammer the store while the main thread destroys it.
fn writers_racing_destroy() {
    let mut test = TestStore::new();
    let barrier = Barrier::new(THREADS + 1);
    let acked = AtomicUsize::new(0);

    thread::scope(|s| {
        for t in 0..THREADS {
            let store = &test.store;
            let barrier = &barrier;
            let acked = &acked;
            s.spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD * 10 {
                    // A writer racing destroy may already hold the stopped worker.
                    match store.set_item(format!("t{}-{}", t, i), "v") {
                        Ok(()) => {
                            acked.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => {
                            assert!(e.is_not_initialized() || e.is_invalid_state());
                            break;
                        }
                    }
                }
            });
        }
        barrier.wait();
        test.store.destroy().unwrap();
    });

    // Keys are unique, so every acknowledged write is exactly one row.
    test.reinit();
    assert_eq!(test.store.get_length().unwrap(), acked.load(Ordering::SeqCst));
}

#[test]
fn destroy_keeps_every_acknowledged_write() {
    for _ in 0..10 {
        writers_racing_destroy();
    }
}
