//! Whole-tree consistency checks
//!
//! Managers keep these true after every successful call. The checks are
//! used by tests and by callers that build trees by hand.

use crate::errors::{InsprError, Result};
use crate::model::App;
use crate::ops::lookup::walk;
use crate::ops::reindex::reindex;

/// Entities without a canonical UUID
///
/// Returns `(scope, entity name)` pairs. The root dApp is skipped.
pub fn find_missing_uuids(root: &App) -> Vec<(String, String)> {
    let mut missing = Vec::new();

    walk(root, |scope, app| {
        if !scope.is_empty() && !app.meta.has_valid_uuid() {
            missing.push((scope.to_string(), app.meta.name.clone()));
        }
        let owned = app
            .spec
            .channels
            .values()
            .map(|c| &c.meta)
            .chain(app.spec.types.values().map(|t| &t.meta))
            .chain(app.spec.aliases.values().map(|a| &a.meta));
        for meta in owned {
            if !meta.has_valid_uuid() {
                missing.push((scope.to_string(), meta.name.clone()));
            }
        }
    });

    missing
}

/// Channels whose type is not declared in the same dApp
///
/// Returns `(scope, channel, type)` tuples.
pub fn find_dangling_channel_types(root: &App) -> Vec<(String, String, String)> {
    let mut dangling = Vec::new();

    walk(root, |scope, app| {
        for (name, channel) in &app.spec.channels {
            if !app.spec.types.contains_key(&channel.spec.type_name) {
                dangling.push((
                    scope.to_string(),
                    name.clone(),
                    channel.spec.type_name.clone(),
                ));
            }
        }
    });

    dangling
}

/// Entities whose `meta.parent` is not the scope they are stored in
///
/// Children and owned entities must point at the dApp holding them.
/// Returns `(scope, entity name, recorded parent)` tuples.
pub fn find_parent_mismatches(root: &App) -> Vec<(String, String, String)> {
    let mut mismatches = Vec::new();

    walk(root, |scope, app| {
        let owned = app
            .spec
            .apps
            .values()
            .map(|a| &a.meta)
            .chain(app.spec.channels.values().map(|c| &c.meta))
            .chain(app.spec.types.values().map(|t| &t.meta))
            .chain(app.spec.aliases.values().map(|a| &a.meta));
        for meta in owned {
            if meta.parent != scope {
                mismatches.push((scope.to_string(), meta.name.clone(), meta.parent.clone()));
            }
        }
    });

    mismatches
}

/// Scopes of dApps holding both a node and children
pub fn find_node_and_children(root: &App) -> Vec<String> {
    let mut found = Vec::new();
    walk(root, |scope, app| {
        if app.has_node() && app.has_children() {
            found.push(scope.to_string());
        }
    });
    found
}

/// Whether the stored reverse indices differ from freshly computed ones
pub fn has_reverse_index_drift(root: &App) -> bool {
    let mut fresh = root.clone();
    reindex(&mut fresh);
    fresh != *root
}

/// Run every check above
///
/// # Errors
///
/// `Internal` describing the first class of violation found.
pub fn validate_tree(root: &App) -> Result<()> {
    let internal = |message: String| Err(InsprError::Internal { message });

    let missing = find_missing_uuids(root);
    if !missing.is_empty() {
        return internal(format!("entities without a valid UUID: {:?}", missing));
    }
    let dangling = find_dangling_channel_types(root);
    if !dangling.is_empty() {
        return internal(format!("channels with unknown types: {:?}", dangling));
    }
    let mismatches = find_parent_mismatches(root);
    if !mismatches.is_empty() {
        return internal(format!("entities with a wrong parent: {:?}", mismatches));
    }
    let mixed = find_node_and_children(root);
    if !mixed.is_empty() {
        return internal(format!("dApps with a node and children: {:?}", mixed));
    }
    if has_reverse_index_drift(root) {
        return internal("reverse indices are out of date".to_string());
    }
    Ok(())
}
