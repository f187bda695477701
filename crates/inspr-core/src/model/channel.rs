use serde::{Deserialize, Serialize};

use super::metadata::Metadata;

/// A typed message topic owned by a dApp
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub meta: Metadata,
    pub spec: ChannelSpec,

    /// Child dApps whose boundary maps to this channel. Maintained by the store.
    pub connected_apps: Vec<String>,

    /// Aliases of the owning dApp that target this channel. Maintained by the store.
    pub connected_aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSpec {
    /// Name of a Type in the same scope
    #[serde(rename = "type")]
    pub type_name: String,

    /// Ordered broker preference
    pub broker_priority_list: Vec<String>,

    pub selected_broker: String,
}

impl Channel {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            meta: Metadata::named(name),
            spec: ChannelSpec {
                type_name: type_name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_brokers<I, S>(mut self, priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.broker_priority_list = priority.into_iter().map(Into::into).collect();
        self
    }

    /// Whether anything in the tree still points at this channel
    pub fn is_referenced(&self) -> bool {
        !self.connected_apps.is_empty() || !self.connected_aliases.is_empty()
    }
}
