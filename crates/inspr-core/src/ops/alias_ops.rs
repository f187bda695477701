use crate::errors::{InsprError, Result};
use crate::model::{Alias, App, EntityKind};
use crate::rules::scope::split_last;

use super::lookup::{find_alias, find_app, find_app_mut};
use super::observe;
use super::reindex::reindex;

/// CRUD over boundary aliases
///
/// `create` and `update` are addressed from the child dApp whose boundary
/// entry is re-pointed; the alias itself is stored in the parent, keyed
/// `"<child>.<boundary>"`. `get` and `delete` take the owning scope and
/// that key.
pub struct AliasManager<'t> {
    tree: &'t mut App,
}

/// Where an alias for `scope`/`boundary` would live
struct Placement {
    parent_scope: String,
    child: String,
    key: String,
}

impl<'t> AliasManager<'t> {
    pub fn new(tree: &'t mut App) -> Self {
        Self { tree }
    }

    /// # Errors
    ///
    /// `AppNotFound` or `EntityNotFound`.
    pub fn get(&self, scope: &str, key: &str) -> Result<&Alias> {
        observe("alias_get", EntityKind::Alias, scope, key, || {
            find_alias(self.tree, scope, key)
        })
    }

    /// Re-point `target_boundary` of the dApp at `scope` to `alias.resource`
    ///
    /// # Errors
    ///
    /// * `RootHasNoParent` - `scope` is the root
    /// * `AppNotFound` - `scope` does not resolve
    /// * `BoundaryNotDeclared` - the dApp doesn't declare `target_boundary`
    /// * `AlreadyExists` - the parent already holds this alias
    /// * `AliasTargetInvalid` - the resource is neither a channel nor a boundary
    ///   entry of the parent
    pub fn create(&mut self, scope: &str, target_boundary: &str, alias: &Alias) -> Result<()> {
        observe("alias_create", EntityKind::Alias, scope, target_boundary, || {
            let place = self.placement(scope, target_boundary, alias)?;
            let parent = find_app(self.tree, &place.parent_scope)?;
            if parent.spec.aliases.contains_key(&place.key) {
                return Err(InsprError::AlreadyExists {
                    entity: EntityKind::Alias,
                    scope: place.parent_scope.clone(),
                    name: place.key.clone(),
                });
            }

            let mut candidate = stamped(alias, &place, target_boundary);
            candidate.meta.inject_uuid();
            self.insert(place, candidate)
        })
    }

    /// Replace an existing alias, keeping its UUID
    ///
    /// # Errors
    ///
    /// Same as [`AliasManager::create`], with `EntityNotFound` instead of
    /// `AlreadyExists`.
    pub fn update(&mut self, scope: &str, target_boundary: &str, alias: &Alias) -> Result<()> {
        observe("alias_update", EntityKind::Alias, scope, target_boundary, || {
            let place = self.placement(scope, target_boundary, alias)?;
            let current = find_alias(self.tree, &place.parent_scope, &place.key)?;

            let mut candidate = stamped(alias, &place, target_boundary);
            candidate.meta.uuid = current.meta.uuid.clone();
            self.insert(place, candidate)
        })
    }

    /// # Errors
    ///
    /// * `InvalidAlias` - `key` is not of the form `<child>.<boundary>`
    /// * `AppNotFound` or `EntityNotFound` - nothing to delete
    /// * `EntityInUse` - the child dApp still declares the aliased boundary
    pub fn delete(&mut self, scope: &str, key: &str) -> Result<()> {
        observe("alias_delete", EntityKind::Alias, scope, key, || {
            let (child, boundary) = split_alias_key(key)?;
            find_alias(self.tree, scope, key)?;
            let owner = find_app(self.tree, scope)?;

            let in_use = owner
                .spec
                .apps
                .get(child)
                .is_some_and(|c| c.spec.boundary.contains(boundary));
            if in_use {
                return Err(InsprError::EntityInUse {
                    entity: EntityKind::Alias,
                    scope: scope.to_string(),
                    name: key.to_string(),
                    users: vec![child.to_string()],
                });
            }

            find_app_mut(self.tree, scope)?.spec.aliases.remove(key);
            reindex(self.tree);
            Ok(())
        })
    }

    fn placement(&self, scope: &str, target_boundary: &str, alias: &Alias) -> Result<Placement> {
        if scope.is_empty() {
            return Err(InsprError::RootHasNoParent);
        }
        let app = find_app(self.tree, scope)?;
        if !app.spec.boundary.contains(target_boundary) {
            return Err(InsprError::BoundaryNotDeclared {
                app: scope.to_string(),
                boundary: target_boundary.to_string(),
            });
        }

        let (parent_scope, child) = split_last(scope)?;
        let parent = find_app(self.tree, &parent_scope)?;
        let target_ok = parent.spec.channels.contains_key(&alias.resource)
            || (!parent_scope.is_empty() && parent.spec.boundary.contains(&alias.resource));
        if !target_ok {
            return Err(InsprError::AliasTargetInvalid {
                scope: parent_scope,
                target: alias.resource.clone(),
            });
        }

        let key = Alias::key(&child, target_boundary);
        Ok(Placement {
            parent_scope,
            child,
            key,
        })
    }

    fn insert(&mut self, place: Placement, alias: Alias) -> Result<()> {
        find_app_mut(self.tree, &place.parent_scope)?
            .spec
            .aliases
            .insert(place.key, alias);
        reindex(self.tree);
        Ok(())
    }
}

fn split_alias_key(key: &str) -> Result<(&str, &str)> {
    match Alias::split_key(key) {
        Some((child, boundary)) if !child.is_empty() && !boundary.is_empty() => {
            Ok((child, boundary))
        }
        _ => Err(InsprError::InvalidAlias {
            name: key.to_string(),
            reason: "key must be '<child>.<boundary>'".to_string(),
        }),
    }
}

fn stamped(alias: &Alias, place: &Placement, target_boundary: &str) -> Alias {
    let mut candidate = alias.clone();
    candidate.meta.name = place.key.clone();
    candidate.meta.parent = place.parent_scope.clone();
    candidate.destination = place.child.clone();
    candidate.source = target_boundary.to_string();
    candidate
}
