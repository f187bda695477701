//! Manifest importer orchestration
//!
//! Applies parsed documents to an open transaction through the tree
//! managers. Each document creates its entity, or updates it when one with
//! the same name already exists at the target scope. The caller decides
//! whether to commit or cancel.

use std::time::Instant;

use inspr_core::errors::InsprError;
use inspr_core::model::{Alias, EntityKind};
use inspr_core::rules::{join_scopes, split_last};
use inspr_core::{log_op_end, log_op_error, log_op_start};
use inspr_core::{AliasGetter, AppGetter, ChannelGetter, Transaction, TypeGetter};
use serde::Serialize;

use crate::errors::{import_failed, Result};

use super::format::Manifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyAction {
    Created,
    Updated,
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    /// Position of the document in the input
    pub index: usize,
    pub kind: EntityKind,
    pub scope: String,
    pub name: String,
    pub action: ApplyAction,
}

/// Apply `manifests` to `tx`
///
/// Documents are applied shallowest owner first, so a dApp exists before
/// anything scoped inside it. At each depth types go first, then channels,
/// dApps and aliases; documents of the same kind keep their input order.
/// The first failure stops the import and the transaction keeps every
/// document applied before it.
///
/// # Errors
///
/// The manager error of the failing document, wrapped with its index.
pub fn import_manifests(tx: &mut Transaction<'_>, manifests: &[Manifest]) -> Result<Vec<Applied>> {
    log_op_start!(
        "manifest_import",
        transaction_id = %tx.id(),
        documents = manifests.len()
    );
    let start = Instant::now();

    let result = apply_in_order(tx, manifests);

    let duration = start.elapsed().as_millis() as u64;
    match &result {
        Ok(applied) => log_op_end!(
            "manifest_import",
            duration_ms = duration,
            applied = applied.len()
        ),
        Err(e) => log_op_error!("manifest_import", e.clone(), duration_ms = duration),
    }
    result
}

fn apply_in_order(tx: &mut Transaction<'_>, manifests: &[Manifest]) -> Result<Vec<Applied>> {
    let mut order: Vec<usize> = (0..manifests.len()).collect();
    order.sort_by_key(|&i| {
        let manifest = &manifests[i];
        (manifest.owner_depth(), manifest.apply_rank(), i)
    });

    let mut applied = Vec::with_capacity(manifests.len());
    for index in order {
        let manifest = &manifests[index];
        let action = apply_one(tx, manifest).map_err(|e| import_failed(index, e))?;
        tracing::debug!(
            index,
            kind = %manifest.entity_kind(),
            scope = manifest.scope(),
            entity = manifest.name(),
            ?action,
            "manifest document applied"
        );
        applied.push(Applied {
            index,
            kind: manifest.entity_kind(),
            scope: manifest.scope().to_string(),
            name: manifest.name().to_string(),
            action,
        });
    }
    Ok(applied)
}

fn apply_one(
    tx: &mut Transaction<'_>,
    manifest: &Manifest,
) -> std::result::Result<ApplyAction, InsprError> {
    match manifest {
        Manifest::Dapp { scope, dapp } => {
            let path = join_scopes(scope, &dapp.meta.name)?;
            if tx.get_app(&path).is_ok() {
                tx.apps().update(&path, dapp)?;
                Ok(ApplyAction::Updated)
            } else {
                tx.apps().create(scope, dapp)?;
                Ok(ApplyAction::Created)
            }
        }
        Manifest::Channel { scope, channel } => {
            if tx.get_channel(scope, &channel.meta.name).is_ok() {
                tx.channels().update(scope, channel)?;
                Ok(ApplyAction::Updated)
            } else {
                tx.channels().create(scope, channel)?;
                Ok(ApplyAction::Created)
            }
        }
        Manifest::Type {
            scope,
            channel_type,
        } => {
            if tx.get_type(scope, &channel_type.meta.name).is_ok() {
                tx.types().update(scope, channel_type)?;
                Ok(ApplyAction::Updated)
            } else {
                tx.types().create(scope, channel_type)?;
                Ok(ApplyAction::Created)
            }
        }
        Manifest::Alias {
            scope,
            boundary,
            alias,
        } => {
            let (parent, child) = split_last(scope)?;
            if tx.get_alias(&parent, &Alias::key(&child, boundary)).is_ok() {
                tx.aliases().update(scope, boundary, alias)?;
                Ok(ApplyAction::Updated)
            } else {
                tx.aliases().create(scope, boundary, alias)?;
                Ok(ApplyAction::Created)
            }
        }
    }
}

