use std::sync::Arc;

use inspr_core::{Alias, App, Boundary, Channel, ChannelType, Node, StaticBrokers, TreeStore};
use inspr_engine::EngineCommand;

#[allow(dead_code)]
pub const ORDER_SCHEMA: &str = r#"{"type":"record","name":"order","fields":[]}"#;

#[allow(dead_code)]
pub fn new_store() -> TreeStore {
    TreeStore::new(Arc::new(StaticBrokers::with_brokers(["kafka"])))
}

#[allow(dead_code)]
pub fn type_create(name: &str, schema: &str) -> EngineCommand {
    EngineCommand::TypeCreate {
        scope: String::new(),
        channel_type: ChannelType::new(name, schema),
    }
}

#[allow(dead_code)]
pub fn channel_create(name: &str, type_name: &str) -> EngineCommand {
    EngineCommand::ChannelCreate {
        scope: String::new(),
        channel: Channel::new(name, type_name).with_brokers(["kafka"]),
    }
}

/// Root channels `orders` and `audit`, plus a `pipeline` dApp whose child
/// `reader` reads `orders` through the alias `reader.source` and writes
/// `audit` directly.
#[allow(dead_code)]
pub fn pipeline_commands() -> Vec<EngineCommand> {
    let reader = App::new("reader")
        .with_node(Node::with_image("registry.local/reader:1.0").with_env("LOG_LEVEL", "info"))
        .with_boundary(Boundary::new(["source"], ["audit"]));
    let pipeline = App::new("pipeline")
        .with_boundary(Boundary::new(["orders"], ["audit"]))
        .with_alias("reader.source", Alias::new("orders"))
        .with_app(reader);

    vec![
        type_create("order", ORDER_SCHEMA),
        channel_create("orders", "order"),
        channel_create("audit", "order"),
        EngineCommand::AppCreate {
            scope: String::new(),
            app: pipeline,
        },
    ]
}
