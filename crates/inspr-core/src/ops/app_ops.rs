use std::collections::BTreeMap;

use crate::brokers::{select_broker, BrokerRegistry};
use crate::errors::{InsprError, Result};
use crate::model::{Alias, App, EntityKind};
use crate::rules::scope::split_last;
use crate::rules::validation::validate_app_subtree;

use super::boundary::resolve_boundary;
use super::lookup::{find_app, find_app_mut};
use super::observe;
use super::reindex::reindex;

/// CRUD over the dApps of a tree
///
/// Obtained from [`Transaction::apps`](super::Transaction::apps). Every
/// operation validates fully before mutating, so a failed call leaves the
/// tree untouched.
pub struct AppManager<'t> {
    tree: &'t mut App,
    brokers: &'t dyn BrokerRegistry,
}

impl<'t> AppManager<'t> {
    pub fn new(tree: &'t mut App, brokers: &'t dyn BrokerRegistry) -> Self {
        Self { tree, brokers }
    }

    /// Get the dApp at a dotted path; `""` is the root
    ///
    /// # Errors
    ///
    /// `AppNotFound` at the first missing segment.
    pub fn get(&self, query: &str) -> Result<&App> {
        observe("app_get", EntityKind::App, query, "", || {
            find_app(self.tree, query)
        })
    }

    /// Insert `app` as a child of the dApp at `scope`
    ///
    /// The whole subtree is validated against its future parent first.
    /// Parents are stamped on every entity, fresh UUIDs assigned, brokers
    /// selected for every channel, and reverse indices rebuilt.
    ///
    /// # Errors
    ///
    /// * `AppNotFound` - `scope` does not resolve
    /// * `AlreadyExists` - a sibling has the same name
    /// * `InvalidApp` - the subtree breaks a structural rule
    /// * `NoBrokersAvailable` - the subtree has channels but no broker is installed
    pub fn create(&mut self, scope: &str, app: &App) -> Result<()> {
        let name = app.meta.name.clone();
        observe("app_create", EntityKind::App, scope, &name, || {
            let parent = find_app(self.tree, scope)?;
            if parent.spec.apps.contains_key(&name) {
                return Err(InsprError::AlreadyExists {
                    entity: EntityKind::App,
                    scope: scope.to_string(),
                    name: name.clone(),
                });
            }

            let mut candidate = app.clone();
            stamp_app(&mut candidate, scope);
            validate_app_subtree(&candidate, parent, scope.is_empty())?;
            assign_identity(&mut candidate, None, self.brokers)?;

            find_app_mut(self.tree, scope)?
                .spec
                .apps
                .insert(name.clone(), candidate);
            reindex(self.tree);
            Ok(())
        })
    }

    /// Remove the dApp at `query` together with everything it owns
    ///
    /// Reverse indices everywhere are rebuilt, so channels the dApp (or
    /// any descendant) was connected to no longer list it. Aliases of the
    /// parent keyed for the removed dApp are left in place.
    ///
    /// # Errors
    ///
    /// * `CannotDeleteRoot` - `query` is empty
    /// * `AppNotFound` - `query` does not resolve
    /// * `Internal` - the dApp is still reachable after removal
    pub fn delete(&mut self, query: &str) -> Result<()> {
        observe("app_delete", EntityKind::App, query, "", || {
            if query.is_empty() {
                return Err(InsprError::CannotDeleteRoot);
            }
            find_app(self.tree, query)?;
            let (parent_scope, name) = split_last(query)?;

            find_app_mut(self.tree, &parent_scope)?
                .spec
                .apps
                .remove(&name);
            reindex(self.tree);

            if find_app(self.tree, query).is_ok() {
                return Err(InsprError::Internal {
                    message: format!("dApp '{}' still present after delete", query),
                });
            }
            Ok(())
        })
    }

    /// Replace the dApp at `query` with `app`
    ///
    /// Names are immutable. UUIDs of the dApp and of every channel, type,
    /// alias and descendant that keeps its name are carried over.
    ///
    /// # Errors
    ///
    /// * `RootHasNoParent` - `query` is the root
    /// * `AppNotFound` - `query` does not resolve
    /// * `NameImmutable` - `app` is named differently
    /// * `InvalidApp` - the new subtree breaks a structural rule
    pub fn update(&mut self, query: &str, app: &App) -> Result<()> {
        let name = app.meta.name.clone();
        observe("app_update", EntityKind::App, query, &name, || {
            if query.is_empty() {
                return Err(InsprError::RootHasNoParent);
            }
            let current = find_app(self.tree, query)?;
            if current.meta.name != name {
                return Err(InsprError::NameImmutable {
                    current: current.meta.name.clone(),
                    requested: name.clone(),
                });
            }

            let (parent_scope, _) = split_last(query)?;
            let parent = find_app(self.tree, &parent_scope)?;

            let mut candidate = app.clone();
            stamp_app(&mut candidate, &parent_scope);
            validate_app_subtree(&candidate, parent, parent_scope.is_empty())?;
            assign_identity(&mut candidate, Some(current), self.brokers)?;

            find_app_mut(self.tree, &parent_scope)?
                .spec
                .apps
                .insert(name.clone(), candidate);
            reindex(self.tree);
            Ok(())
        })
    }

    /// Map each boundary entry of `app` to its channel's dotted path
    ///
    /// # Errors
    ///
    /// `BoundaryUnresolved` listing every entry that does not reach a channel.
    pub fn resolve_boundary(&self, app: &App) -> Result<BTreeMap<String, String>> {
        observe(
            "app_resolve_boundary",
            EntityKind::App,
            &app.meta.parent,
            &app.meta.name,
            || resolve_boundary(self.tree, app),
        )
    }
}

fn child_scope(scope: &str, name: &str) -> String {
    match (scope.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => scope.to_string(),
        _ => format!("{}.{}", scope, name),
    }
}

/// Stamp a dApp about to live under `parent_scope`
fn stamp_app(app: &mut App, parent_scope: &str) {
    app.meta.parent = parent_scope.to_string();
    let scope = child_scope(parent_scope, &app.meta.name);
    stamp_contents(app, &scope);
}

/// Stamp names and parents on everything owned by the dApp at `scope`
///
/// Empty entity names are filled from their map keys. Reverse-index fields
/// are cleared; `reindex` rebuilds them once the subtree is in place.
pub(crate) fn stamp_contents(app: &mut App, scope: &str) {
    let app_name = app.meta.name.clone();
    let app_parent = app.meta.parent.clone();

    if let Some(node) = app.spec.node.as_mut().filter(|n| !n.is_empty()) {
        node.meta.name = app_name;
        node.meta.parent = app_parent;
    }

    for (key, channel) in app.spec.channels.iter_mut() {
        if channel.meta.name.is_empty() {
            channel.meta.name = key.clone();
        }
        channel.meta.parent = scope.to_string();
        channel.connected_apps.clear();
        channel.connected_aliases.clear();
    }

    for (key, ty) in app.spec.types.iter_mut() {
        if ty.meta.name.is_empty() {
            ty.meta.name = key.clone();
        }
        ty.meta.parent = scope.to_string();
        ty.connected_channels.clear();
    }

    for (key, alias) in app.spec.aliases.iter_mut() {
        alias.meta.name = key.clone();
        alias.meta.parent = scope.to_string();
        if let Some((child, boundary)) = Alias::split_key(key) {
            if alias.destination.is_empty() {
                alias.destination = child.to_string();
            }
            if alias.source.is_empty() {
                alias.source = boundary.to_string();
            }
        }
    }

    for (key, child) in app.spec.apps.iter_mut() {
        if child.meta.name.is_empty() {
            child.meta.name = key.clone();
        }
        child.meta.parent = scope.to_string();
        let nested = child_scope(scope, &child.meta.name);
        stamp_contents(child, &nested);
    }
}

/// Assign UUIDs and selected brokers across a candidate subtree
///
/// UUIDs come from the matching entity of `previous` when there is one, so
/// updates never regenerate them.
fn assign_identity(
    app: &mut App,
    previous: Option<&App>,
    brokers: &dyn BrokerRegistry,
) -> Result<()> {
    let keep = |old: Option<&str>, uuid: &mut String| match old.filter(|u| !u.is_empty()) {
        Some(u) => *uuid = u.to_string(),
        None => *uuid = uuid::Uuid::new_v4().to_string(),
    };

    keep(previous.map(|p| p.meta.uuid.as_str()), &mut app.meta.uuid);
    let app_uuid = app.meta.uuid.clone();
    if let Some(node) = app.spec.node.as_mut().filter(|n| !n.is_empty()) {
        node.meta.uuid = app_uuid;
    }

    for (key, channel) in app.spec.channels.iter_mut() {
        let old = previous.and_then(|p| p.spec.channels.get(key));
        keep(old.map(|c| c.meta.uuid.as_str()), &mut channel.meta.uuid);
        channel.spec.selected_broker = select_broker(&channel.spec.broker_priority_list, brokers)?;
    }

    for (key, ty) in app.spec.types.iter_mut() {
        let old = previous.and_then(|p| p.spec.types.get(key));
        keep(old.map(|t| t.meta.uuid.as_str()), &mut ty.meta.uuid);
    }

    for (key, alias) in app.spec.aliases.iter_mut() {
        let old = previous.and_then(|p| p.spec.aliases.get(key));
        keep(old.map(|a| a.meta.uuid.as_str()), &mut alias.meta.uuid);
    }

    for (key, child) in app.spec.apps.iter_mut() {
        let old = previous.and_then(|p| p.spec.apps.get(key));
        assign_identity(child, old, brokers)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokers::StaticBrokers;
    use crate::model::{is_canonical_uuid, Boundary, Channel, ChannelType, Node};

    fn kafka() -> StaticBrokers {
        StaticBrokers::with_brokers(["kafka"])
    }

    fn base() -> App {
        let mut root = App::default()
            .with_type(ChannelType::new("t1", "{}"))
            .with_channel(Channel::new("ch1", "t1"));
        stamp_contents(&mut root, "");
        root
    }

    #[test]
    fn test_create_stamps_parent_and_uuid() {
        let brokers = kafka();
        let mut root = base();
        let mut apps = AppManager::new(&mut root, &brokers);

        let app = App::new("p").with_app(App::new("leaf").with_node(Node::with_image("img")));
        apps.create("", &app).unwrap();

        let leaf = apps.get("p.leaf").unwrap();
        assert_eq!(leaf.meta.parent, "p");
        assert!(is_canonical_uuid(&leaf.meta.uuid));
        let node = leaf.node().unwrap();
        assert_eq!(node.meta.name, "leaf");
        assert_eq!(node.meta.parent, "p");
        assert_eq!(node.meta.uuid, leaf.meta.uuid);
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let brokers = kafka();
        let mut root = base();
        let mut apps = AppManager::new(&mut root, &brokers);
        apps.create("", &App::new("a")).unwrap();

        let err = apps.create("", &App::new("a")).unwrap_err();
        assert!(matches!(err, InsprError::AlreadyExists { .. }));
    }

    #[test]
    fn test_failed_create_leaves_tree_untouched() {
        let brokers = kafka();
        let mut root = base();
        let before = root.clone();
        let mut apps = AppManager::new(&mut root, &brokers);

        let bad = App::new("a").with_boundary(Boundary::new(["missing"], Vec::<String>::new()));
        assert!(apps.create("", &bad).is_err());
        assert_eq!(root, before);
    }

    #[test]
    fn test_update_keeps_uuids() {
        let brokers = kafka();
        let mut root = base();
        let mut apps = AppManager::new(&mut root, &brokers);

        let app = App::new("p")
            .with_type(ChannelType::new("t", "{}"))
            .with_channel(Channel::new("c", "t"))
            .with_app(App::new("leaf"));
        apps.create("", &app).unwrap();
        let before = apps.get("p").unwrap().clone();

        let mut changed = app.clone();
        changed.meta.reference = "v2".to_string();
        apps.update("p", &changed).unwrap();

        let after = apps.get("p").unwrap();
        assert_eq!(after.meta.uuid, before.meta.uuid);
        assert_eq!(after.spec.channels["c"].meta.uuid, before.spec.channels["c"].meta.uuid);
        assert_eq!(after.spec.types["t"].meta.uuid, before.spec.types["t"].meta.uuid);
        assert_eq!(after.spec.apps["leaf"].meta.uuid, before.spec.apps["leaf"].meta.uuid);
        assert_eq!(after.meta.reference, "v2");
    }

    #[test]
    fn test_update_rename_rejected() {
        let brokers = kafka();
        let mut root = base();
        let mut apps = AppManager::new(&mut root, &brokers);
        apps.create("", &App::new("a")).unwrap();

        let err = apps.update("a", &App::new("b")).unwrap_err();
        assert!(matches!(err, InsprError::NameImmutable { .. }));
    }

    #[test]
    fn test_delete_root_rejected() {
        let brokers = kafka();
        let mut root = base();
        let mut apps = AppManager::new(&mut root, &brokers);
        assert_eq!(apps.delete(""), Err(InsprError::CannotDeleteRoot));
    }

    #[test]
    fn test_channels_without_brokers_fail() {
        let brokers = StaticBrokers::new();
        let mut root = base();
        let mut apps = AppManager::new(&mut root, &brokers);

        let app = App::new("p")
            .with_type(ChannelType::new("t", "{}"))
            .with_channel(Channel::new("c", "t"));
        assert_eq!(apps.create("", &app), Err(InsprError::NoBrokersAvailable));
    }
}
