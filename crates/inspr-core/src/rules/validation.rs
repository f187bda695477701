use crate::errors::{InsprError, Result};
use crate::model::App;

use super::names::{alias_name_is_valid, structure_name_is_valid};

/// Validate a candidate dApp subtree against the parent it will live in
///
/// Every level of the subtree is checked and all violations are reported
/// together:
///
/// 1. Names of the dApp, its channels, types, aliases and children are valid
/// 2. A dApp has a node or children, never both
/// 3. The parent does not have a node
/// 4. Every channel references a type of the same dApp and does not share a
///    name with a boundary entry
/// 5. Every alias targets a channel or boundary entry of its dApp
/// 6. Every boundary entry resolves in the parent: a channel, an alias keyed
///    `<dApp>.<entry>`, or a boundary entry of a non-root parent
///
/// # Arguments
/// * `app` - Candidate subtree; child map keys must equal child names
/// * `parent` - The dApp that will own `app`
/// * `parent_is_root` - Whether `parent` is the tree root
///
/// # Errors
/// `InvalidApp` carrying every violation found.
pub fn validate_app_subtree(app: &App, parent: &App, parent_is_root: bool) -> Result<()> {
    let mut reasons = Vec::new();
    check_app(app, parent, parent_is_root, &mut reasons);

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(InsprError::InvalidApp {
            name: app.meta.name.clone(),
            reasons,
        })
    }
}

fn check_app(app: &App, parent: &App, parent_is_root: bool, reasons: &mut Vec<String>) {
    let name = &app.meta.name;

    if let Err(e) = structure_name_is_valid(name) {
        reasons.push(e.to_string());
    }

    if app.has_node() && app.has_children() {
        reasons.push(format!("dApp '{}' has both a node and child dApps", name));
    }

    if parent.has_node() {
        reasons.push(format!(
            "parent dApp '{}' has a node and cannot hold child dApps",
            parent.meta.name
        ));
    }

    for (key, ty) in &app.spec.types {
        if let Err(e) = structure_name_is_valid(key) {
            reasons.push(e.to_string());
        }
        if ty.meta.name != *key {
            reasons.push(format!(
                "type key '{}' doesn't match its name '{}'",
                key, ty.meta.name
            ));
        }
    }

    for (key, channel) in &app.spec.channels {
        if let Err(e) = structure_name_is_valid(key) {
            reasons.push(e.to_string());
        }
        if channel.meta.name != *key {
            reasons.push(format!(
                "channel key '{}' doesn't match its name '{}'",
                key, channel.meta.name
            ));
        }
        if !app.spec.types.contains_key(&channel.spec.type_name) {
            reasons.push(format!(
                "channel '{}' references unknown type '{}'",
                key, channel.spec.type_name
            ));
        }
        if app.spec.boundary.contains(key) {
            reasons.push(format!(
                "channel '{}' has the same name as a boundary entry of '{}'",
                key, name
            ));
        }
    }

    for (key, alias) in &app.spec.aliases {
        if let Err(e) = alias_name_is_valid(key) {
            reasons.push(e.to_string());
        }
        let target_exists = app.spec.channels.contains_key(&alias.resource)
            || app.spec.boundary.contains(&alias.resource);
        if !target_exists {
            reasons.push(format!(
                "alias '{}' targets '{}' which is neither a channel nor a boundary entry of '{}'",
                key, alias.resource, name
            ));
        }
    }

    for entry in app.spec.boundary.union() {
        let resolves = parent.spec.channels.contains_key(&entry)
            || parent
                .spec
                .aliases
                .contains_key(&format!("{}.{}", name, entry))
            || (!parent_is_root && parent.spec.boundary.contains(&entry));
        if !resolves {
            reasons.push(format!(
                "boundary '{}' of dApp '{}' doesn't resolve in its parent scope",
                entry, name
            ));
        }
    }

    for (key, child) in &app.spec.apps {
        if child.meta.name != *key {
            reasons.push(format!(
                "dApp key '{}' doesn't match its name '{}'",
                key, child.meta.name
            ));
        }
        check_app(child, app, false, reasons);
    }
}
