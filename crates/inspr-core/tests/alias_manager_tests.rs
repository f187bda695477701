#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{leaf, store_with_channel};
use inspr_core::errors::ExErrorKind;
use inspr_core::{Alias, AliasGetter, App, AppGetter, Boundary, Channel, ChannelGetter, ExError};

/// Root with ch1; composite `p` exposing `pa` and `pb`; child `c` using `pa`
fn pass_through_store() -> inspr_core::TreeStore {
    let store = store_with_channel();
    common::committed(&store, |tx| {
        tx.channels().create("", &Channel::new("ch2", "t1")).unwrap();
        let p = App::new("p")
            .with_boundary(Boundary::new(["ch1", "ch2"], Vec::<String>::new()))
            .with_app(leaf("c", &["ch1"]));
        tx.apps().create("", &p).unwrap();
    });
    store
}

#[test]
fn test_create_retargets_child_boundary() {
    // GIVEN c reads ch1 through p
    let store = pass_through_store();
    let mut tx = store.init_transaction().unwrap();

    // WHEN c's ch1 entry is aliased to p's ch2 entry
    tx.aliases()
        .create("p.c", "ch1", &Alias::new("ch2"))
        .unwrap();

    // THEN the alias lives in p and c now resolves to root ch2
    let alias = tx.get_alias("p", "c.ch1").unwrap();
    assert_eq!(alias.meta.parent, "p");
    let c = tx.get_app("p.c").unwrap().clone();
    assert_eq!(tx.resolve_boundary(&c).unwrap()["ch1"], "ch2");
    tx.cancel();
}

#[test]
fn test_create_duplicate_rejected() {
    let store = pass_through_store();
    let mut tx = store.init_transaction().unwrap();
    tx.aliases()
        .create("p.c", "ch1", &Alias::new("ch2"))
        .unwrap();

    let err = tx
        .aliases()
        .create("p.c", "ch1", &Alias::new("ch1"))
        .unwrap_err();
    assert_eq!(ExError::from(err).kind(), ExErrorKind::AlreadyExists);
    tx.cancel();
}

#[test]
fn test_target_must_be_channel_or_boundary_of_parent() {
    let store = pass_through_store();
    let mut tx = store.init_transaction().unwrap();

    let err = tx
        .aliases()
        .create("p.c", "ch1", &Alias::new("nothing"))
        .unwrap_err();
    assert_eq!(ExError::from(err).kind(), ExErrorKind::BadRequest);
    tx.cancel();
}

#[test]
fn test_root_child_alias_targets_root_channel() {
    // GIVEN app1 in the root using ch1, and a second root channel
    let store = store_with_channel();
    let mut tx = store.init_transaction().unwrap();
    tx.channels().create("", &Channel::new("ch2", "t1")).unwrap();
    tx.apps().create("", &leaf("app1", &["ch1"])).unwrap();

    // WHEN aliasing app1's ch1 entry to ch2
    tx.aliases()
        .create("app1", "ch1", &Alias::new("ch2"))
        .unwrap();

    // THEN ch2 lists both app1 and the alias, and ch1 is free
    let ch2 = tx.get_channel("", "ch2").unwrap();
    assert_eq!(ch2.connected_apps, vec!["app1".to_string()]);
    assert_eq!(ch2.connected_aliases, vec!["app1.ch1".to_string()]);
    assert!(tx.get_channel("", "ch1").unwrap().connected_apps.is_empty());
    tx.cancel();
}

#[test]
fn test_delete_after_child_drops_entry() {
    // GIVEN an alias for app1's ch1 entry
    let store = store_with_channel();
    let mut tx = store.init_transaction().unwrap();
    tx.channels().create("", &Channel::new("ch2", "t1")).unwrap();
    tx.apps().create("", &leaf("app1", &["ch1"])).unwrap();
    tx.aliases()
        .create("app1", "ch1", &Alias::new("ch2"))
        .unwrap();

    // WHEN app1 stops declaring ch1
    tx.apps().update("app1", &leaf("app1", &[])).unwrap();

    // THEN the alias can be deleted
    tx.aliases().delete("", "app1.ch1").unwrap();
    assert!(tx.get_alias("", "app1.ch1").is_err());
    assert!(tx.get_channel("", "ch2").unwrap().connected_aliases.is_empty());
    tx.cancel();
}

#[test]
fn test_update_missing_alias_is_not_found() {
    let store = pass_through_store();
    let mut tx = store.init_transaction().unwrap();

    let err = tx
        .aliases()
        .update("p.c", "ch1", &Alias::new("ch2"))
        .unwrap_err();
    assert_eq!(ExError::from(err).kind(), ExErrorKind::NotFound);
    tx.cancel();
}
