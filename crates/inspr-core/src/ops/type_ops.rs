use crate::errors::{InsprError, Result};
use crate::model::{App, ChannelType, EntityKind};
use crate::rules::names::structure_name_is_valid;

use super::lookup::{find_app, find_app_mut, find_type};
use super::observe;
use super::reindex::reindex;

/// CRUD over the channel types of each dApp
pub struct TypeManager<'t> {
    tree: &'t mut App,
}

impl<'t> TypeManager<'t> {
    pub fn new(tree: &'t mut App) -> Self {
        Self { tree }
    }

    /// # Errors
    ///
    /// `AppNotFound` or `EntityNotFound`.
    pub fn get(&self, scope: &str, name: &str) -> Result<&ChannelType> {
        observe("type_get", EntityKind::Type, scope, name, || {
            find_type(self.tree, scope, name)
        })
    }

    /// # Errors
    ///
    /// * `InvalidName` - malformed type name
    /// * `InvalidType` - `scope` does not resolve to a dApp
    /// * `AlreadyExists` - a type with this name exists in `scope`
    pub fn create(&mut self, scope: &str, ty: &ChannelType) -> Result<()> {
        let name = ty.meta.name.clone();
        observe("type_create", EntityKind::Type, scope, &name, || {
            structure_name_is_valid(&name)?;
            let owner = find_app(self.tree, scope).map_err(|e| InsprError::InvalidType {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            if owner.spec.types.contains_key(&name) {
                return Err(InsprError::AlreadyExists {
                    entity: EntityKind::Type,
                    scope: scope.to_string(),
                    name: name.clone(),
                });
            }

            let mut candidate = ty.clone();
            candidate.meta.parent = scope.to_string();
            candidate.meta.inject_uuid();
            candidate.connected_channels.clear();

            find_app_mut(self.tree, scope)?
                .spec
                .types
                .insert(name.clone(), candidate);
            reindex(self.tree);
            Ok(())
        })
    }

    /// Replace schema and metadata, keeping UUID and connected channels
    ///
    /// # Errors
    ///
    /// `AppNotFound` or `EntityNotFound`.
    pub fn update(&mut self, scope: &str, ty: &ChannelType) -> Result<()> {
        let name = ty.meta.name.clone();
        observe("type_update", EntityKind::Type, scope, &name, || {
            let current = find_type(self.tree, scope, &name)?;

            let mut candidate = ty.clone();
            candidate.meta.parent = scope.to_string();
            candidate.meta.uuid = current.meta.uuid.clone();
            candidate.connected_channels = current.connected_channels.clone();

            find_app_mut(self.tree, scope)?
                .spec
                .types
                .insert(name.clone(), candidate);
            reindex(self.tree);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// * `AppNotFound` or `EntityNotFound` - nothing to delete
    /// * `EntityInUse` - channels still use the type
    pub fn delete(&mut self, scope: &str, name: &str) -> Result<()> {
        observe("type_delete", EntityKind::Type, scope, name, || {
            let current = find_type(self.tree, scope, name)?;
            if !current.connected_channels.is_empty() {
                return Err(InsprError::EntityInUse {
                    entity: EntityKind::Type,
                    scope: scope.to_string(),
                    name: name.to_string(),
                    users: current.connected_channels.clone(),
                });
            }

            find_app_mut(self.tree, scope)?.spec.types.remove(name);
            reindex(self.tree);
            Ok(())
        })
    }
}
