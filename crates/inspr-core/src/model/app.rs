use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::alias::Alias;
use super::boundary::Boundary;
use super::channel::Channel;
use super::channel_type::ChannelType;
use super::metadata::Metadata;
use super::node::Node;

/// A node of the dApp tree
///
/// Either a leaf carrying a `Node` workload or a composite of child dApps,
/// never both. Every dApp may own channels, types and aliases.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    pub meta: Metadata,
    pub spec: AppSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<Node>,
    pub apps: BTreeMap<String, App>,
    pub channels: BTreeMap<String, Channel>,
    pub types: BTreeMap<String, ChannelType>,
    pub aliases: BTreeMap<String, Alias>,
    pub boundary: Boundary,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: Metadata::named(name),
            spec: AppSpec::default(),
        }
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.spec.node = Some(node);
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.spec.boundary = boundary;
        self
    }

    pub fn with_app(mut self, app: App) -> Self {
        self.spec.apps.insert(app.meta.name.clone(), app);
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.spec.channels.insert(channel.meta.name.clone(), channel);
        self
    }

    pub fn with_type(mut self, ty: ChannelType) -> Self {
        self.spec.types.insert(ty.meta.name.clone(), ty);
        self
    }

    pub fn with_alias(mut self, key: impl Into<String>, alias: Alias) -> Self {
        self.spec.aliases.insert(key.into(), alias);
        self
    }

    /// The workload node, if present and non-empty
    pub fn node(&self) -> Option<&Node> {
        self.spec.node.as_ref().filter(|n| !n.is_empty())
    }

    pub fn has_node(&self) -> bool {
        self.node().is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.spec.apps.is_empty()
    }
}
