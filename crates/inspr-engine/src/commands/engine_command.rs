//! Engine-level mutation commands.
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging for requests:
//! - `log_op_start!` at entry, tagged with the request id
//! - `log_op_end!` on commit, with the transaction id and number of changes
//! - `log_op_error!` when the transaction is cancelled
//!
//! Managers below log their own start/end events per call.

use std::time::Instant;

use inspr_core::diff::Changelog;
use inspr_core::errors::ExError;
use inspr_core::model::{Alias, App, Channel, ChannelType, EntityKind};
use inspr_core::{log_op_end, log_op_error, log_op_start};
use inspr_core::{TreeStore, Transaction};
use inspr_core_types::{RequestContext, TransactionId};
use serde::{Deserialize, Serialize};

use crate::errors::{batch_failed, command_failed, Result};

/// One manager mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    AppCreate {
        scope: String,
        app: App,
    },
    AppUpdate {
        query: String,
        app: App,
    },
    AppDelete {
        query: String,
    },
    ChannelCreate {
        scope: String,
        channel: Channel,
    },
    ChannelUpdate {
        scope: String,
        channel: Channel,
    },
    ChannelDelete {
        scope: String,
        name: String,
    },
    TypeCreate {
        scope: String,
        channel_type: ChannelType,
    },
    TypeUpdate {
        scope: String,
        channel_type: ChannelType,
    },
    TypeDelete {
        scope: String,
        name: String,
    },
    /// `scope` is the child dApp, `boundary` the entry being redirected
    AliasCreate {
        scope: String,
        boundary: String,
        alias: Alias,
    },
    AliasUpdate {
        scope: String,
        boundary: String,
        alias: Alias,
    },
    /// `scope` is the dApp holding the alias, `key` is `<child>.<boundary>`
    AliasDelete {
        scope: String,
        key: String,
    },
}

impl EngineCommand {
    /// Log op name of this command
    pub fn op(&self) -> &'static str {
        match self {
            EngineCommand::AppCreate { .. } => "app_create",
            EngineCommand::AppUpdate { .. } => "app_update",
            EngineCommand::AppDelete { .. } => "app_delete",
            EngineCommand::ChannelCreate { .. } => "channel_create",
            EngineCommand::ChannelUpdate { .. } => "channel_update",
            EngineCommand::ChannelDelete { .. } => "channel_delete",
            EngineCommand::TypeCreate { .. } => "type_create",
            EngineCommand::TypeUpdate { .. } => "type_update",
            EngineCommand::TypeDelete { .. } => "type_delete",
            EngineCommand::AliasCreate { .. } => "alias_create",
            EngineCommand::AliasUpdate { .. } => "alias_update",
            EngineCommand::AliasDelete { .. } => "alias_delete",
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            EngineCommand::AppCreate { .. }
            | EngineCommand::AppUpdate { .. }
            | EngineCommand::AppDelete { .. } => EntityKind::App,
            EngineCommand::ChannelCreate { .. }
            | EngineCommand::ChannelUpdate { .. }
            | EngineCommand::ChannelDelete { .. } => EntityKind::Channel,
            EngineCommand::TypeCreate { .. }
            | EngineCommand::TypeUpdate { .. }
            | EngineCommand::TypeDelete { .. } => EntityKind::Type,
            EngineCommand::AliasCreate { .. }
            | EngineCommand::AliasUpdate { .. }
            | EngineCommand::AliasDelete { .. } => EntityKind::Alias,
        }
    }

    /// Scope and entity name, for log fields
    pub fn target(&self) -> (&str, &str) {
        match self {
            EngineCommand::AppCreate { scope, app } => (scope.as_str(), app.meta.name.as_str()),
            EngineCommand::AppUpdate { query, app } => (query.as_str(), app.meta.name.as_str()),
            EngineCommand::AppDelete { query } => (query.as_str(), ""),
            EngineCommand::ChannelCreate { scope, channel }
            | EngineCommand::ChannelUpdate { scope, channel } => {
                (scope.as_str(), channel.meta.name.as_str())
            }
            EngineCommand::TypeCreate {
                scope,
                channel_type,
            }
            | EngineCommand::TypeUpdate {
                scope,
                channel_type,
            } => (scope.as_str(), channel_type.meta.name.as_str()),
            EngineCommand::ChannelDelete { scope, name }
            | EngineCommand::TypeDelete { scope, name } => (scope.as_str(), name.as_str()),
            EngineCommand::AliasCreate {
                scope, boundary, ..
            }
            | EngineCommand::AliasUpdate {
                scope, boundary, ..
            } => (scope.as_str(), boundary.as_str()),
            EngineCommand::AliasDelete { scope, key } => (scope.as_str(), key.as_str()),
        }
    }

    fn apply(&self, tx: &mut Transaction<'_>) -> inspr_core::Result<()> {
        match self {
            EngineCommand::AppCreate { scope, app } => tx.apps().create(scope, app),
            EngineCommand::AppUpdate { query, app } => tx.apps().update(query, app),
            EngineCommand::AppDelete { query } => tx.apps().delete(query),
            EngineCommand::ChannelCreate { scope, channel } => {
                tx.channels().create(scope, channel)
            }
            EngineCommand::ChannelUpdate { scope, channel } => {
                tx.channels().update(scope, channel)
            }
            EngineCommand::ChannelDelete { scope, name } => tx.channels().delete(scope, name),
            EngineCommand::TypeCreate {
                scope,
                channel_type,
            } => tx.types().create(scope, channel_type),
            EngineCommand::TypeUpdate {
                scope,
                channel_type,
            } => tx.types().update(scope, channel_type),
            EngineCommand::TypeDelete { scope, name } => tx.types().delete(scope, name),
            EngineCommand::AliasCreate {
                scope,
                boundary,
                alias,
            } => tx.aliases().create(scope, boundary, alias),
            EngineCommand::AliasUpdate {
                scope,
                boundary,
                alias,
            } => tx.aliases().update(scope, boundary, alias),
            EngineCommand::AliasDelete { scope, key } => tx.aliases().delete(scope, key),
        }
    }
}

/// Outcome of a committed command or batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineCommandResult {
    pub transaction_id: TransactionId,
    /// Committed tree against the tree before the transaction
    pub changelog: Changelog,
    /// Number of commands applied
    pub commands: usize,
}

/// Apply one command in its own transaction
///
/// Commits when the manager call succeeds, cancels otherwise.
///
/// # Errors
///
/// The manager error tagged with the command op and request id, or
/// `Timeout` when the writer lock could not be acquired in time.
pub fn apply_engine_command(
    store: &TreeStore,
    cmd: EngineCommand,
    ctx: &RequestContext,
) -> Result<EngineCommandResult> {
    let command = cmd.op();
    let (scope, entity) = cmd.target();
    log_op_start!(
        "engine_command",
        request_id = ctx.request_id.as_str(),
        command = command,
        scope = scope,
        entity = entity
    );
    let start = Instant::now();

    let result = run_in_transaction(store, std::slice::from_ref(&cmd), ctx, |_, e| e);

    let duration = start.elapsed().as_millis() as u64;
    match &result {
        Ok(r) => log_op_end!(
            "engine_command",
            duration_ms = duration,
            request_id = ctx.request_id.as_str(),
            command = command,
            transaction_id = %r.transaction_id,
            changes_len = r.changelog.len()
        ),
        Err(e) => log_op_error!(
            "engine_command",
            e.clone(),
            duration_ms = duration,
            request_id = ctx.request_id.as_str(),
            command = command
        ),
    }
    result
}

/// Apply several commands in one transaction, all or nothing
///
/// # Errors
///
/// The first failing command's error, wrapped with its position in the
/// batch. Nothing from the batch is committed in that case.
pub fn apply_batch(
    store: &TreeStore,
    cmds: &[EngineCommand],
    ctx: &RequestContext,
) -> Result<EngineCommandResult> {
    log_op_start!(
        "engine_batch",
        request_id = ctx.request_id.as_str(),
        commands = cmds.len()
    );
    let start = Instant::now();

    let result = run_in_transaction(store, cmds, ctx, |index, e| batch_failed(index, ctx, e));

    let duration = start.elapsed().as_millis() as u64;
    match &result {
        Ok(r) => log_op_end!(
            "engine_batch",
            duration_ms = duration,
            request_id = ctx.request_id.as_str(),
            transaction_id = %r.transaction_id,
            changes_len = r.changelog.len()
        ),
        Err(e) => log_op_error!(
            "engine_batch",
            e.clone(),
            duration_ms = duration,
            request_id = ctx.request_id.as_str()
        ),
    }
    result
}

fn run_in_transaction<W>(
    store: &TreeStore,
    cmds: &[EngineCommand],
    ctx: &RequestContext,
    wrap: W,
) -> Result<EngineCommandResult>
where
    W: Fn(usize, ExError) -> ExError,
{
    let mut tx = store
        .init_transaction()
        .map_err(|e| command_failed("init_transaction", ctx, e))?;
    let transaction_id = tx.id();

    for (index, cmd) in cmds.iter().enumerate() {
        if let Err(e) = cmd.apply(&mut tx) {
            tx.cancel();
            return Err(wrap(index, command_failed(cmd.op(), ctx, e)));
        }
        tracing::debug!(
            request_id = ctx.request_id.as_str(),
            transaction_id = %transaction_id,
            index,
            op = cmd.op(),
            "command applied to shadow tree"
        );
    }

    let changelog = match tx.changes() {
        Ok(changelog) => changelog,
        Err(e) => {
            tx.cancel();
            return Err(command_failed("transaction_changes", ctx, e));
        }
    };
    tx.commit();

    Ok(EngineCommandResult {
        transaction_id,
        changelog,
        commands: cmds.len(),
    })
}
