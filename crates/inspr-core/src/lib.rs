//! Inspr Core - in-memory dApp tree with transactional mutation
//!
//! This crate holds the control-plane model and everything that keeps it
//! consistent:
//! - dApp, Channel, Type and Alias entities
//! - Name, scope and structural validation
//! - A tree store with single-writer shadow-copy transactions
//! - Managers enforcing referential rules, with reverse indices rebuilt after each change
//! - Boundary resolution through aliases
//! - A structural diff between two trees

pub mod brokers;
pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;

// Macros refer to schema constants through this path
pub use inspr_core_types;

pub use brokers::{select_broker, BrokerRegistry, StaticBrokers};
pub use config::{ConfigError, InsprConfig};
pub use diff::{diff, Changelog};
pub use errors::{ExError, ExErrorKind, InsprError, Result};
pub use model::{Alias, App, Boundary, Channel, ChannelType, EntityKind, Metadata, Node};
pub use ops::{
    AliasGetter, AppGetter, ChannelGetter, PermTree, Transaction, TreeReader, TreeStore,
    TypeGetter,
};
