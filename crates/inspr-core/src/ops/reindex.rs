//! Reverse-index maintenance
//!
//! `Channel::connected_apps`, `Channel::connected_aliases` and
//! `ChannelType::connected_channels` are derived data. They are rebuilt from
//! scratch after every successful mutation instead of being patched in
//! place, so they can never drift from the boundaries and aliases they
//! summarize.

use std::collections::BTreeMap;

use crate::model::{Alias, App};

/// Recompute every reverse index in the subtree rooted at `app`
///
/// For each dApp `P`:
/// - a channel of `P` lists the children of `P` with a boundary entry that
///   maps to it, either by name or through an alias of `P` keyed
///   `<child>.<entry>`
/// - a channel of `P` lists the aliases of `P` targeting it
/// - a type of `P` lists the channels of `P` using it
///
/// Lists are sorted.
pub fn reindex(app: &mut App) {
    for child in app.spec.apps.values_mut() {
        reindex(child);
    }

    let spec = &mut app.spec;

    let mut apps_by_channel: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (child_name, child) in &spec.apps {
        for entry in child.spec.boundary.union() {
            let target = spec
                .aliases
                .get(&Alias::key(child_name, &entry))
                .map(|a| a.resource.clone())
                .unwrap_or(entry);
            let users = apps_by_channel.entry(target).or_default();
            if !users.contains(child_name) {
                users.push(child_name.clone());
            }
        }
    }

    let mut aliases_by_channel: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, alias) in &spec.aliases {
        aliases_by_channel
            .entry(alias.resource.clone())
            .or_default()
            .push(key.clone());
    }

    let mut channels_by_type: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, channel) in &spec.channels {
        channels_by_type
            .entry(channel.spec.type_name.clone())
            .or_default()
            .push(name.clone());
    }

    for (name, channel) in spec.channels.iter_mut() {
        channel.connected_apps = apps_by_channel.remove(name).unwrap_or_default();
        channel.connected_aliases = aliases_by_channel.remove(name).unwrap_or_default();
    }
    for (name, ty) in spec.types.iter_mut() {
        ty.connected_channels = channels_by_type.remove(name).unwrap_or_default();
    }
}
