//! Path lookups over a dApp tree

use crate::errors::{InsprError, Result};
use crate::model::{Alias, App, Channel, ChannelType, EntityKind};

/// Walk `query` one segment at a time from `root`; `""` is the root
///
/// # Errors
///
/// `AppNotFound` at the first missing segment.
pub fn find_app<'a>(root: &'a App, query: &str) -> Result<&'a App> {
    if query.is_empty() {
        return Ok(root);
    }
    let mut current = root;
    for segment in query.split('.') {
        current = current
            .spec
            .apps
            .get(segment)
            .ok_or_else(|| not_found(query))?;
    }
    Ok(current)
}

/// Mutable counterpart of [`find_app`]
///
/// # Errors
///
/// `AppNotFound` at the first missing segment.
pub fn find_app_mut<'a>(root: &'a mut App, query: &str) -> Result<&'a mut App> {
    if query.is_empty() {
        return Ok(root);
    }
    let mut current = root;
    for segment in query.split('.') {
        current = current
            .spec
            .apps
            .get_mut(segment)
            .ok_or_else(|| not_found(query))?;
    }
    Ok(current)
}

fn not_found(query: &str) -> InsprError {
    InsprError::AppNotFound {
        query: query.to_string(),
    }
}

fn missing(entity: EntityKind, scope: &str, name: &str) -> InsprError {
    InsprError::EntityNotFound {
        entity,
        scope: scope.to_string(),
        name: name.to_string(),
    }
}

/// # Errors
///
/// `AppNotFound` or `EntityNotFound`.
pub fn find_channel<'a>(root: &'a App, scope: &str, name: &str) -> Result<&'a Channel> {
    find_app(root, scope)?
        .spec
        .channels
        .get(name)
        .ok_or_else(|| missing(EntityKind::Channel, scope, name))
}

/// # Errors
///
/// `AppNotFound` or `EntityNotFound`.
pub fn find_type<'a>(root: &'a App, scope: &str, name: &str) -> Result<&'a ChannelType> {
    find_app(root, scope)?
        .spec
        .types
        .get(name)
        .ok_or_else(|| missing(EntityKind::Type, scope, name))
}

/// # Errors
///
/// `AppNotFound` or `EntityNotFound`.
pub fn find_alias<'a>(root: &'a App, scope: &str, key: &str) -> Result<&'a Alias> {
    find_app(root, scope)?
        .spec
        .aliases
        .get(key)
        .ok_or_else(|| missing(EntityKind::Alias, scope, key))
}

/// Visit every dApp with its scope, parents before children
pub fn walk<'a, F>(root: &'a App, mut visit: F)
where
    F: FnMut(&str, &'a App),
{
    fn go<'a, F: FnMut(&str, &'a App)>(app: &'a App, scope: &str, visit: &mut F) {
        visit(scope, app);
        for (name, child) in &app.spec.apps {
            let child_scope = if scope.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", scope, name)
            };
            go(child, &child_scope, visit);
        }
    }
    go(root, "", &mut visit);
}
