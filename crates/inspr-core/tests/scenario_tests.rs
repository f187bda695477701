#![allow(clippy::unwrap_used, clippy::expect_used)]

/// End-to-end scenarios over the tree store and its managers
mod common;

use common::{leaf, store_with_channel};
use inspr_core::errors::ExErrorKind;
use inspr_core::{
    diff, Alias, App, AppGetter, Boundary, ChannelGetter, ExError, InsprError, Node, TypeGetter,
};

#[test]
fn test_scenario_a_boundary_registers_connected_app() {
    // GIVEN type t1 and channel ch1 in the root
    let store = store_with_channel();

    // WHEN app1 declaring ch1 as input is created in the root
    let mut tx = store.init_transaction().unwrap();
    tx.apps().create("", &leaf("app1", &["ch1"])).unwrap();
    tx.commit();

    // THEN ch1 lists app1 and t1 lists ch1
    let perm = store.perm();
    let ch1 = perm.get_channel("", "ch1").unwrap();
    assert_eq!(ch1.connected_apps, vec!["app1".to_string()]);
    let t1 = perm.get_type("", "t1").unwrap();
    assert_eq!(t1.connected_channels, vec!["ch1".to_string()]);
}

#[test]
fn test_scenario_b_referenced_channel_cannot_be_deleted() {
    // GIVEN scenario A
    let store = store_with_channel();
    let mut tx = store.init_transaction().unwrap();
    tx.apps().create("", &leaf("app1", &["ch1"])).unwrap();

    // WHEN deleting ch1
    let err = tx.channels().delete("", "ch1").unwrap_err();

    // THEN the error is a bad request and ch1 remains
    assert_eq!(ExError::from(err).kind(), ExErrorKind::BadRequest);
    assert!(tx.get_channel("", "ch1").is_ok());
    tx.cancel();
}

#[test]
fn test_scenario_c_deleting_app_releases_channel() {
    // GIVEN scenario A
    let store = store_with_channel();
    let mut tx = store.init_transaction().unwrap();
    tx.apps().create("", &leaf("app1", &["ch1"])).unwrap();

    // WHEN app1 is deleted
    tx.apps().delete("app1").unwrap();

    // THEN ch1 has no connected apps and can now be deleted
    assert!(tx.get_channel("", "ch1").unwrap().connected_apps.is_empty());
    tx.channels().delete("", "ch1").unwrap();
    tx.commit();

    assert!(store.perm().get_channel("", "ch1").is_err());
}

#[test]
fn test_scenario_d_alias_blocks_underlying_channel() {
    // GIVEN a composite dApp p using root ch1, whose child app1 reaches it
    // through the alias app1.al1
    let store = store_with_channel();
    let p = App::new("p")
        .with_boundary(Boundary::new(["ch1"], Vec::<String>::new()))
        .with_alias("app1.al1", Alias::new("ch1"))
        .with_app(leaf("app1", &["al1"]));

    let mut tx = store.init_transaction().unwrap();
    tx.apps().create("", &p).unwrap();

    // WHEN reading the alias back
    let alias = tx.aliases().get("p", "app1.al1").unwrap().clone();

    // THEN it targets ch1 on behalf of app1
    assert_eq!(alias.resource, "ch1");
    assert_eq!(alias.destination, "app1");
    assert_eq!(alias.source, "al1");
    assert!(alias.meta.has_valid_uuid());

    // AND app1 resolves al1 all the way to the root channel
    let app1 = tx.get_app("p.app1").unwrap().clone();
    let resolved = tx.resolve_boundary(&app1).unwrap();
    assert_eq!(resolved["al1"], "ch1");

    // AND neither the alias nor ch1 can be deleted while in use
    let alias_err = tx.aliases().delete("p", "app1.al1").unwrap_err();
    assert!(matches!(alias_err, InsprError::EntityInUse { .. }));
    let channel_err = tx.channels().delete("", "ch1").unwrap_err();
    assert!(matches!(channel_err, InsprError::EntityInUse { .. }));
    tx.cancel();
}

#[test]
fn test_scenario_e_single_image_change() {
    // GIVEN two trees differing only in x's node image
    let store = store_with_channel();
    let mut tx = store.init_transaction().unwrap();
    tx.apps()
        .create("", &App::new("x").with_node(Node::with_image("img:v1")))
        .unwrap();
    tx.commit();

    let mut tx = store.init_transaction().unwrap();
    let mut x = tx.get_app("x").unwrap().clone();
    if let Some(node) = x.spec.node.as_mut() {
        node.spec.image = "img:v2".to_string();
    }
    tx.apps().update("x", &x).unwrap();

    // WHEN diffing committed against shadow
    let changelog = tx.changes().unwrap();

    // THEN exactly one change with one difference is reported
    assert_eq!(changelog.len(), 1);
    let change = &changelog.0[0];
    assert!(change.context.ends_with(".x"));
    assert_eq!(change.diff.len(), 1);
    assert_eq!(change.diff[0].field, "Spec.Node.Spec.Image");
    assert_eq!(change.diff[0].from, "img:v1");
    assert_eq!(change.diff[0].to, "img:v2");

    // AND the same result comes from diffing the snapshots directly
    let direct = diff(store.perm().root(), tx.root()).unwrap();
    assert_eq!(direct, changelog);
    tx.cancel();
}
