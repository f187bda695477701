use crate::brokers::{select_broker, BrokerRegistry};
use crate::errors::{InsprError, Result};
use crate::model::{App, Channel, EntityKind};
use crate::rules::names::structure_name_is_valid;

use super::lookup::{find_app, find_app_mut, find_channel};
use super::observe;
use super::reindex::reindex;

/// CRUD over the channels of each dApp
pub struct ChannelManager<'t> {
    tree: &'t mut App,
    brokers: &'t dyn BrokerRegistry,
}

impl<'t> ChannelManager<'t> {
    pub fn new(tree: &'t mut App, brokers: &'t dyn BrokerRegistry) -> Self {
        Self { tree, brokers }
    }

    /// # Errors
    ///
    /// `AppNotFound` or `EntityNotFound`.
    pub fn get(&self, scope: &str, name: &str) -> Result<&Channel> {
        observe("channel_get", EntityKind::Channel, scope, name, || {
            find_channel(self.tree, scope, name)
        })
    }

    /// Add `channel` to the dApp at `scope`
    ///
    /// The selected broker is stamped from the registry; reverse-index
    /// fields supplied by the caller are ignored.
    ///
    /// # Errors
    ///
    /// * `InvalidName` - malformed channel name
    /// * `AppNotFound` - `scope` does not resolve
    /// * `AlreadyExists` - a channel with this name exists in `scope`
    /// * `InvalidChannel` - unknown type, or the name is a boundary entry of the owner
    /// * `NoBrokersAvailable` - no broker installed
    pub fn create(&mut self, scope: &str, channel: &Channel) -> Result<()> {
        let name = channel.meta.name.clone();
        observe("channel_create", EntityKind::Channel, scope, &name, || {
            structure_name_is_valid(&name)?;
            let owner = find_app(self.tree, scope)?;
            if owner.spec.channels.contains_key(&name) {
                return Err(InsprError::AlreadyExists {
                    entity: EntityKind::Channel,
                    scope: scope.to_string(),
                    name: name.clone(),
                });
            }
            check_placement(owner, channel)?;

            let mut candidate = channel.clone();
            candidate.meta.parent = scope.to_string();
            candidate.meta.inject_uuid();
            candidate.connected_apps.clear();
            candidate.connected_aliases.clear();
            candidate.spec.selected_broker =
                select_broker(&candidate.spec.broker_priority_list, self.brokers)?;

            find_app_mut(self.tree, scope)?
                .spec
                .channels
                .insert(name.clone(), candidate);
            reindex(self.tree);
            Ok(())
        })
    }

    /// Replace the channel named like `channel` in `scope`
    ///
    /// UUID and reverse-index fields are kept from the stored channel; the
    /// rest comes from `channel`. The broker is selected again in case the
    /// priority list changed.
    ///
    /// # Errors
    ///
    /// * `AppNotFound` or `EntityNotFound` - nothing to update
    /// * `InvalidChannel` - unknown type
    /// * `NoBrokersAvailable` - no broker installed
    pub fn update(&mut self, scope: &str, channel: &Channel) -> Result<()> {
        let name = channel.meta.name.clone();
        observe("channel_update", EntityKind::Channel, scope, &name, || {
            let current = find_channel(self.tree, scope, &name)?;
            let owner = find_app(self.tree, scope)?;
            check_placement(owner, channel)?;

            let mut candidate = channel.clone();
            candidate.meta.parent = scope.to_string();
            candidate.meta.uuid = current.meta.uuid.clone();
            candidate.connected_apps = current.connected_apps.clone();
            candidate.connected_aliases = current.connected_aliases.clone();
            candidate.spec.selected_broker =
                select_broker(&candidate.spec.broker_priority_list, self.brokers)?;

            find_app_mut(self.tree, scope)?
                .spec
                .channels
                .insert(name.clone(), candidate);
            reindex(self.tree);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// * `AppNotFound` or `EntityNotFound` - nothing to delete
    /// * `EntityInUse` - a child dApp or an alias still points at the channel
    pub fn delete(&mut self, scope: &str, name: &str) -> Result<()> {
        observe("channel_delete", EntityKind::Channel, scope, name, || {
            let current = find_channel(self.tree, scope, name)?;
            if current.is_referenced() {
                let users = current
                    .connected_apps
                    .iter()
                    .chain(current.connected_aliases.iter())
                    .cloned()
                    .collect();
                return Err(InsprError::EntityInUse {
                    entity: EntityKind::Channel,
                    scope: scope.to_string(),
                    name: name.to_string(),
                    users,
                });
            }

            find_app_mut(self.tree, scope)?.spec.channels.remove(name);
            reindex(self.tree);
            Ok(())
        })
    }
}

fn check_placement(owner: &App, channel: &Channel) -> Result<()> {
    let name = &channel.meta.name;
    if !owner.spec.types.contains_key(&channel.spec.type_name) {
        return Err(InsprError::InvalidChannel {
            name: name.clone(),
            reason: format!("type '{}' not found in scope", channel.spec.type_name),
        });
    }
    if owner.spec.boundary.contains(name) {
        return Err(InsprError::InvalidChannel {
            name: name.clone(),
            reason: format!("'{}' is already a boundary entry of the owning dApp", name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokers::StaticBrokers;
    use crate::model::{is_canonical_uuid, ChannelType};

    fn root() -> App {
        App::default().with_type(ChannelType::new("t1", "{}"))
    }

    #[test]
    fn test_create_selects_broker_and_uuid() {
        let brokers = StaticBrokers::with_brokers(["kafka", "sqs"]);
        let mut tree = root();
        let mut channels = ChannelManager::new(&mut tree, &brokers);

        channels
            .create("", &Channel::new("ch1", "t1").with_brokers(["sqs"]))
            .unwrap();

        let ch = channels.get("", "ch1").unwrap();
        assert_eq!(ch.spec.selected_broker, "sqs");
        assert!(is_canonical_uuid(&ch.meta.uuid));
    }

    #[test]
    fn test_create_unknown_type_rejected() {
        let brokers = StaticBrokers::with_brokers(["kafka"]);
        let mut tree = root();
        let mut channels = ChannelManager::new(&mut tree, &brokers);

        let err = channels.create("", &Channel::new("ch1", "nope")).unwrap_err();
        assert!(matches!(err, InsprError::InvalidChannel { .. }));
    }

    #[test]
    fn test_create_bad_name_rejected() {
        let brokers = StaticBrokers::with_brokers(["kafka"]);
        let mut tree = root();
        let mut channels = ChannelManager::new(&mut tree, &brokers);

        let err = channels.create("", &Channel::new("-bad", "t1")).unwrap_err();
        assert!(matches!(err, InsprError::InvalidName { .. }));
    }

    #[test]
    fn test_update_preserves_uuid_and_links() {
        let brokers = StaticBrokers::with_brokers(["kafka"]);
        let mut tree = root().with_type(ChannelType::new("t2", "{}"));
        let mut channels = ChannelManager::new(&mut tree, &brokers);
        channels.create("", &Channel::new("ch1", "t1")).unwrap();
        let uuid = channels.get("", "ch1").unwrap().meta.uuid.clone();

        let mut changed = Channel::new("ch1", "t2");
        changed.meta.uuid = "ignored".to_string();
        channels.update("", &changed).unwrap();

        let ch = channels.get("", "ch1").unwrap();
        assert_eq!(ch.meta.uuid, uuid);
        assert_eq!(ch.spec.type_name, "t2");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let brokers = StaticBrokers::with_brokers(["kafka"]);
        let mut tree = root();
        let mut channels = ChannelManager::new(&mut tree, &brokers);

        let err = channels.update("", &Channel::new("ch1", "t1")).unwrap_err();
        assert!(matches!(err, InsprError::EntityNotFound { .. }));
    }

    #[test]
    fn test_delete_unreferenced() {
        let brokers = StaticBrokers::with_brokers(["kafka"]);
        let mut tree = root();
        let mut channels = ChannelManager::new(&mut tree, &brokers);
        channels.create("", &Channel::new("ch1", "t1")).unwrap();

        channels.delete("", "ch1").unwrap();
        assert!(channels.get("", "ch1").is_err());
        assert!(tree.spec.types["t1"].connected_channels.is_empty());
    }
}
