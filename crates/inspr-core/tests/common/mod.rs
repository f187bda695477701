use std::sync::Arc;

use inspr_core::{App, Boundary, Channel, ChannelType, StaticBrokers, TreeStore};

/// Broker registry with a single `kafka` broker
#[allow(dead_code)]
pub fn kafka() -> Arc<StaticBrokers> {
    Arc::new(StaticBrokers::with_brokers(["kafka"]))
}

/// Empty store backed by [`kafka`]
#[allow(dead_code)]
pub fn new_store() -> TreeStore {
    TreeStore::new(kafka())
}

/// Store whose committed root holds type `t1` and channel `ch1`
///
/// Both are created through the managers so they carry UUIDs and a
/// selected broker.
#[allow(dead_code)]
pub fn store_with_channel() -> TreeStore {
    let store = new_store();
    let mut tx = store.init_transaction().unwrap();
    tx.types().create("", &ChannelType::new("t1", "{}")).unwrap();
    tx.channels().create("", &Channel::new("ch1", "t1")).unwrap();
    tx.commit();
    store
}

/// A leaf dApp with a node and the given inputs
#[allow(dead_code)]
pub fn leaf(name: &str, inputs: &[&str]) -> App {
    App::new(name)
        .with_node(inspr_core::Node::with_image(format!("{}:latest", name)))
        .with_boundary(Boundary::new(inputs.iter().copied(), Vec::<String>::new()))
}

/// Run `f` in a transaction and commit it
#[allow(dead_code)]
pub fn committed<F>(store: &TreeStore, f: F)
where
    F: FnOnce(&mut inspr_core::Transaction<'_>),
{
    let mut tx = store.init_transaction().unwrap();
    f(&mut tx);
    tx.commit();
}
