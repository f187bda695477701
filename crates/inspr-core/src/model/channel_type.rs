use serde::{Deserialize, Serialize};

use super::metadata::Metadata;

/// Message schema shared by channels of one scope
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelType {
    pub meta: Metadata,

    /// Opaque schema text
    pub schema: String,

    /// Channels in the same scope using this type. Maintained by the store.
    pub connected_channels: Vec<String>,
}

impl ChannelType {
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            meta: Metadata::named(name),
            schema: schema.into(),
            connected_channels: Vec::new(),
        }
    }
}
