//! Manifest document schema
//!
//! One YAML document describes one entity and where it goes:
//!
//! ```yaml
//! kind: channel
//! scope: group
//! channel:
//!   meta:
//!     name: orders
//!   spec:
//!     type: order
//!     broker_priority_list: [kafka]
//! ```
//!
//! Aliases are addressed from the child dApp whose boundary entry they
//! re-point, so they also name that `boundary`.

use inspr_core::model::{Alias, App, Channel, ChannelType, EntityKind, Metadata};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Manifest {
    Dapp {
        /// Scope of the parent dApp; empty for the root
        #[serde(default)]
        scope: String,
        dapp: App,
    },
    Channel {
        #[serde(default)]
        scope: String,
        channel: Channel,
    },
    Type {
        #[serde(default)]
        scope: String,
        #[serde(rename = "type")]
        channel_type: ChannelType,
    },
    Alias {
        /// Scope of the child dApp declaring `boundary`
        scope: String,
        boundary: String,
        alias: Alias,
    },
}

impl Manifest {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Manifest::Dapp { .. } => EntityKind::App,
            Manifest::Channel { .. } => EntityKind::Channel,
            Manifest::Type { .. } => EntityKind::Type,
            Manifest::Alias { .. } => EntityKind::Alias,
        }
    }

    pub fn scope(&self) -> &str {
        match self {
            Manifest::Dapp { scope, .. }
            | Manifest::Channel { scope, .. }
            | Manifest::Type { scope, .. }
            | Manifest::Alias { scope, .. } => scope,
        }
    }

    /// Name of the described entity; for aliases, the boundary entry
    pub fn name(&self) -> &str {
        match self {
            Manifest::Dapp { dapp, .. } => &dapp.meta.name,
            Manifest::Channel { channel, .. } => &channel.meta.name,
            Manifest::Type { channel_type, .. } => &channel_type.meta.name,
            Manifest::Alias { boundary, .. } => boundary,
        }
    }

    pub(crate) fn meta_mut(&mut self) -> &mut Metadata {
        match self {
            Manifest::Dapp { dapp, .. } => &mut dapp.meta,
            Manifest::Channel { channel, .. } => &mut channel.meta,
            Manifest::Type { channel_type, .. } => &mut channel_type.meta,
            Manifest::Alias { alias, .. } => &mut alias.meta,
        }
    }

    /// Depth of the dApp that will hold the entity; the root is 0
    ///
    /// Aliases are stored in the parent of the dApp they are addressed from.
    pub(crate) fn owner_depth(&self) -> usize {
        let depth = match self.scope() {
            "" => 0,
            scope => scope.split('.').count(),
        };
        match self {
            Manifest::Alias { .. } => depth.saturating_sub(1),
            _ => depth,
        }
    }

    /// Import order within one depth: types, then channels, then dApps,
    /// then aliases
    pub(crate) fn apply_rank(&self) -> u8 {
        match self {
            Manifest::Type { .. } => 0,
            Manifest::Channel { .. } => 1,
            Manifest::Dapp { .. } => 2,
            Manifest::Alias { .. } => 3,
        }
    }
}
