//! Row Ordering Tests
//!
//! get_key follows row-creation order.

use crate::common::*;

#[test]
fn get_key_follows_insertion_order() {
    let test = TestStore::new();
    test.store.set_item("x", "1").unwrap();
    test.store.set_item("y", "2").unwrap();

    assert_eq!(test.store.get_key(0).unwrap().as_deref(), Some("x"));
    assert_eq!(test.store.get_key(1).unwrap().as_deref(), Some("y"));
    assert_eq!(test.store.get_key(2).unwrap(), None);
}

#[test]
fn get_key_not_sorted_by_key() {
    let test = TestStore::new();
    for key in ["zebra", "apple", "mango"] {
        test.store.set_item(key, "v").unwrap();
    }
    assert_eq!(test.store.keys().unwrap(), vec!["zebra", "apple", "mango"]);
}

#[test]
fn get_key_on_empty_store() {
    let test = TestStore::new();
    assert_eq!(test.store.get_key(0).unwrap(), None);
    assert_eq!(test.store.get_key(usize::MAX).unwrap(), None);
}

#[test]
fn get_key_skips_removed_rows() {
    let test = TestStore::new();
    for key in ["a", "b", "c"] {
        test.store.set_item(key, "v").unwrap();
    }
    test.store.remove_item("b").unwrap();

    assert_eq!(test.store.get_key(0).unwrap().as_deref(), Some("a"));
    assert_eq!(test.store.get_key(1).unwrap().as_deref(), Some("c"));
    assert_eq!(test.store.get_key(2).unwrap(), None);
}

#[test]
fn replaced_key_moves_to_end() {
    let test = TestStore::new();
    test.store.set_item("x", "1").unwrap();
    test.store.set_item("y", "2").unwrap();
    test.store.set_item("x", "3").unwrap();

    assert_eq!(test.store.get_key(0).unwrap().as_deref(), Some("y"));
    assert_eq!(test.store.get_key(1).unwrap().as_deref(), Some("x"));
}

#[test]
fn every_index_in_range_resolves() {
    let test = TestStore::new();
    for i in 0..20 {
        test.store.set_item(format!("key{:02}", i), "v").unwrap();
    }
    let len = test.store.get_length().unwrap();
    assert_eq!(len, 20);
    for i in 0..len {
        assert_eq!(
            test.store.get_key(i).unwrap(),
            Some(format!("key{:02}", i))
        );
    }
    assert_eq!(test.store.get_key(len).unwrap(), None);
}

#[test]
fn async_ops_apply_in_submission_order() {
    let test = TestStore::new();
    let store = &test.store;

    store.set_item("k", "A").unwrap();
    store.remove_item("k").unwrap();
    store.set_item("k", "C").unwrap();
    store.set_item("other", "1").unwrap();
    store.clear().unwrap();
    store.set_item("last", "Z").unwrap();

    assert_eq!(store.get_item("k").unwrap(), None);
    assert_eq!(store.keys().unwrap(), vec!["last"]);
}
