//! Tree store, transactions and the entity managers
//!
//! All mutation goes through a [`Transaction`] obtained from a
//! [`TreeStore`]. Managers borrow the transaction's shadow tree, validate
//! every precondition before touching it, and recompute reverse indices
//! after each successful change.

pub mod alias_ops;
pub mod app_ops;
pub mod boundary;
pub mod channel_ops;
pub mod getters;
pub mod lookup;
pub mod reindex;
pub mod store;
pub mod type_ops;

pub use alias_ops::AliasManager;
pub use app_ops::AppManager;
pub use boundary::{resolve_boundary, resolve_channels, ResolvedChannel};
pub use channel_ops::ChannelManager;
pub use getters::{AliasGetter, AppGetter, ChannelGetter, TreeReader, TypeGetter};
pub use reindex::reindex;
pub use store::{PermTree, Transaction, TreeStore};
pub use type_ops::TypeManager;

use std::time::Instant;

use crate::errors::Result;
use crate::model::EntityKind;
use crate::{log_op_end, log_op_error, log_op_start};

/// Run a manager operation between start and end/end_error log events
pub(crate) fn observe<T, F>(
    op: &'static str,
    entity_kind: EntityKind,
    scope: &str,
    entity: &str,
    f: F,
) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let kind = entity_kind.to_string();
    log_op_start!(op, entity_kind = kind.as_str(), scope = scope, entity = entity);
    let start = Instant::now();

    let result = f();

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => log_op_end!(
            op,
            duration_ms = elapsed,
            entity_kind = kind.as_str(),
            scope = scope,
            entity = entity
        ),
        Err(e) => log_op_error!(
            op,
            e.clone(),
            duration_ms = elapsed,
            entity_kind = kind.as_str(),
            scope = scope,
            entity = entity
        ),
    }
    result
}
