//! Boundary resolution
//!
//! A dApp names the channels it uses through its boundary. Each entry is
//! looked up in the parent scope: an alias keyed `<dApp>.<entry>` replaces
//! the name with its resource, a channel of that scope ends the walk, and
//! a boundary entry of that scope continues one level up under the
//! parent's own name. Every step moves strictly towards the root, so the
//! walk always terminates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{InsprError, Result};
use crate::model::{Alias, App};
use crate::rules::scope::{join_scopes, split_last};

use super::lookup::find_app;

/// Where one boundary entry ends up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedChannel {
    /// Boundary entry as declared by the dApp
    pub boundary: String,
    /// Scope of the dApp owning the channel
    pub scope: String,
    /// Channel name within `scope`
    pub channel: String,
    /// `scope.channel`, or just `channel` at the root
    pub path: String,
}

/// Map every boundary entry of `app` to the dotted path of its channel
///
/// `app.meta.parent` must hold the dApp's parent scope, as it does for any
/// dApp stored in a tree.
///
/// # Errors
///
/// `BoundaryUnresolved` listing every entry that could not be resolved.
pub fn resolve_boundary(root: &App, app: &App) -> Result<BTreeMap<String, String>> {
    Ok(resolve_channels(root, app)?
        .into_iter()
        .map(|(entry, resolved)| (entry, resolved.path))
        .collect())
}

/// Like [`resolve_boundary`] but keeps the owning scope and channel name
///
/// # Errors
///
/// `BoundaryUnresolved` listing every entry that could not be resolved.
pub fn resolve_channels(root: &App, app: &App) -> Result<BTreeMap<String, ResolvedChannel>> {
    let mut resolved = BTreeMap::new();
    let mut reasons = Vec::new();

    for entry in app.spec.boundary.union() {
        match resolve_entry(root, &app.meta.parent, &app.meta.name, &entry) {
            Ok(r) => {
                resolved.insert(entry, r);
            }
            Err(reason) => reasons.push(reason),
        }
    }

    if reasons.is_empty() {
        Ok(resolved)
    } else {
        Err(InsprError::BoundaryUnresolved {
            app: app.meta.name.clone(),
            reasons,
        })
    }
}

fn resolve_entry(
    root: &App,
    parent_scope: &str,
    app_name: &str,
    entry: &str,
) -> std::result::Result<ResolvedChannel, String> {
    let mut scope = parent_scope.to_string();
    let mut child = app_name.to_string();
    let mut name = entry.to_string();

    loop {
        let owner = find_app(root, &scope).map_err(|e| e.to_string())?;

        if let Some(alias) = owner.spec.aliases.get(&Alias::key(&child, &name)) {
            name = alias.resource.clone();
        }

        if owner.spec.channels.contains_key(&name) {
            let path = join_scopes(&scope, &name).map_err(|e| e.to_string())?;
            return Ok(ResolvedChannel {
                boundary: entry.to_string(),
                scope,
                channel: name,
                path,
            });
        }

        if scope.is_empty() || !owner.spec.boundary.contains(&name) {
            return Err(format!(
                "'{}' resolves to '{}', which is neither a channel nor a boundary entry of scope '{}'",
                entry, name, scope
            ));
        }

        let (up, owner_name) = split_last(&scope).map_err(|e| e.to_string())?;
        scope = up;
        child = owner_name;
    }
}
