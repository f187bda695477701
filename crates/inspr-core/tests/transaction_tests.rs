#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{kafka, leaf, store_with_channel};
use inspr_core::errors::ExErrorKind;
use inspr_core::{App, AppGetter, ChannelGetter, ExError, InsprError, TreeStore};

#[test]
fn test_failed_call_leaves_shadow_untouched() {
    // GIVEN an open transaction with one successful change
    let store = store_with_channel();
    let mut tx = store.init_transaction().unwrap();
    tx.apps().create("", &leaf("app1", &["ch1"])).unwrap();
    let before = tx.root().clone();

    // WHEN a later call fails validation
    let result = tx.apps().create("", &leaf("app2", &["ghost"]));

    // THEN the shadow is exactly as it was
    assert!(result.is_err());
    assert_eq!(*tx.root(), before);
    tx.cancel();
}

#[test]
fn test_readers_see_committed_state_only() {
    let store = store_with_channel();
    let mut tx = store.init_transaction().unwrap();
    tx.apps().create("", &leaf("app1", &["ch1"])).unwrap();

    // shadow has the app, perm does not
    assert!(tx.get_app("app1").is_ok());
    assert!(store.perm().get_app("app1").is_err());
    assert!(store
        .perm()
        .get_channel("", "ch1")
        .unwrap()
        .connected_apps
        .is_empty());

    tx.commit();
    assert!(store.perm().get_app("app1").is_ok());
}

#[test]
fn test_snapshot_outlives_commit() {
    // GIVEN a snapshot taken before a commit
    let store = store_with_channel();
    let snapshot = store.perm();

    let mut tx = store.init_transaction().unwrap();
    tx.apps().create("", &leaf("app1", &["ch1"])).unwrap();
    tx.commit();

    // THEN the old snapshot still shows the old tree
    assert!(snapshot.get_app("app1").is_err());
    assert!(store.perm().get_app("app1").is_ok());
}

#[test]
fn test_writer_waits_for_previous_transaction() {
    // GIVEN a transaction held by another thread for a short while
    let store = Arc::new(TreeStore::new(kafka()).with_timeout(Duration::from_secs(5)));
    let holder = {
        let store = Arc::clone(&store);
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let handle = thread::spawn(move || {
            let mut tx = store.init_transaction().unwrap();
            tx.apps().create("", &App::new("first")).unwrap();
            ready_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(50));
            tx.commit();
        });
        ready_rx.recv().unwrap();
        handle
    };

    // WHEN this thread opens a transaction
    let tx = store.init_transaction().unwrap();

    // THEN it starts from the other thread's committed tree
    assert!(tx.get_app("first").is_ok());
    tx.cancel();
    holder.join().unwrap();
}

#[test]
fn test_abandoned_transaction_times_out_instead_of_deadlocking() {
    let store = store_with_channel().with_timeout(Duration::from_millis(10));
    let _held = store.init_transaction().unwrap();

    let err = store.init_transaction().err().unwrap();
    assert_eq!(ExError::from(err.clone()).kind(), ExErrorKind::Timeout);
    assert!(matches!(err, InsprError::TransactionTimeout { .. }));
}

#[test]
fn test_changes_are_empty_for_untouched_transaction() {
    let store = store_with_channel();
    let tx = store.init_transaction().unwrap();
    assert!(tx.changes().unwrap().is_empty());
    tx.cancel();
}
