//! Entity model of the dApp tree

pub mod alias;
pub mod app;
pub mod boundary;
pub mod channel;
pub mod channel_type;
pub mod metadata;
pub mod node;

pub use alias::Alias;
pub use app::{App, AppSpec};
pub use boundary::Boundary;
pub use channel::{Channel, ChannelSpec};
pub use channel_type::ChannelType;
pub use metadata::{is_canonical_uuid, Metadata};
pub use node::{Node, NodeSpec};

use serde::{Deserialize, Serialize};

/// Kinds of named entity stored in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    App,
    Channel,
    Type,
    Alias,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::App => "dApp",
            EntityKind::Channel => "channel",
            EntityKind::Type => "type",
            EntityKind::Alias => "alias",
        };
        f.write_str(s)
    }
}
