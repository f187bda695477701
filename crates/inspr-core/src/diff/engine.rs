//! Structural diff between two dApp trees.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{InsprError, Result};
use crate::model::{Alias, App, Boundary, Channel, ChannelType, Metadata, Node};

use super::model::{Change, Changelog, Difference, Kind, Operation, NIL, PRESENT};

/// Context of the tree root
pub const ROOT_CONTEXT: &str = "*";

/// Compute the changelog turning `from` into `to`
///
/// Both trees must be rooted at the same logical path. dApps present on
/// only one side are reported shallowly; recursion only enters dApps
/// present in both.
///
/// # Errors
///
/// `DiffMisaligned` when a name or parent differs at any level, meaning the
/// two trees are not comparable at that node.
pub fn diff(from: &App, to: &App) -> Result<Changelog> {
    let context = if to.meta.name.is_empty() {
        ROOT_CONTEXT.to_string()
    } else {
        format!("{}.{}", ROOT_CONTEXT, to.meta.name)
    };

    let mut changelog = Vec::new();
    diff_app(from, to, context, &mut changelog)?;
    Ok(Changelog(changelog))
}

fn diff_app(from: &App, to: &App, context: String, out: &mut Vec<Change>) -> Result<()> {
    let mut change = Change::new(context);

    diff_metadata(&mut change, Kind::APP, "", "", &from.meta, &to.meta)?;
    diff_node(&mut change, from.node(), to.node());
    diff_apps(&mut change, &from.spec.apps, &to.spec.apps);
    diff_channels(&mut change, &from.spec.channels, &to.spec.channels)?;
    diff_types(&mut change, &from.spec.types, &to.spec.types)?;
    diff_boundary(&mut change, &from.spec.boundary, &to.spec.boundary);
    diff_aliases(&mut change, &from.spec.aliases, &to.spec.aliases);

    let context = change.context.clone();
    if !change.diff.is_empty() {
        out.push(change);
    }

    for (name, from_child) in &from.spec.apps {
        if let Some(to_child) = to.spec.apps.get(name) {
            diff_app(
                from_child,
                to_child,
                format!("{}.Spec.Apps.{}", context, name),
                out,
            )?;
        }
    }
    Ok(())
}

fn difference(
    field: String,
    from: impl Into<String>,
    to: impl Into<String>,
    kind: Kind,
    name: &str,
    operation: Operation,
) -> Difference {
    Difference {
        field,
        from: from.into(),
        to: to.into(),
        kind,
        name: name.to_string(),
        operation,
    }
}

/// Keys only in `from`, keys only in `to`, keys in both
fn partition<'a, V>(
    from: &'a BTreeMap<String, V>,
    to: &'a BTreeMap<String, V>,
) -> (Vec<&'a str>, Vec<&'a str>, Vec<&'a str>) {
    let a: BTreeSet<&str> = from.keys().map(String::as_str).collect();
    let b: BTreeSet<&str> = to.keys().map(String::as_str).collect();
    (
        a.difference(&b).copied().collect(),
        b.difference(&a).copied().collect(),
        a.intersection(&b).copied().collect(),
    )
}

fn diff_metadata(
    change: &mut Change,
    parent_kind: Kind,
    element: &str,
    prefix: &str,
    from: &Metadata,
    to: &Metadata,
) -> Result<()> {
    if from.name != to.name {
        return Err(misaligned(change, prefix, "Meta.Name", &from.name, &to.name));
    }
    if from.parent != to.parent {
        return Err(misaligned(
            change,
            prefix,
            "Meta.Parent",
            &from.parent,
            &to.parent,
        ));
    }

    let kind = Kind::META | parent_kind;
    let scalar_fields = [
        ("Meta.Reference", &from.reference, &to.reference),
        ("Meta.SHA256", &from.sha256, &to.sha256),
        ("Meta.UUID", &from.uuid, &to.uuid),
    ];
    for (field, a, b) in scalar_fields {
        if a != b {
            change.push(difference(
                format!("{}{}", prefix, field),
                a.as_str(),
                b.as_str(),
                kind,
                element,
                Operation::UPDATE,
            ));
        }
    }

    let kind = kind | Kind::ANNOTATION;
    let keys: BTreeSet<&String> = from.annotations.keys().chain(to.annotations.keys()).collect();
    for key in keys {
        let (a, b) = (from.annotations.get(key), to.annotations.get(key));
        let operation = match (a, b) {
            (Some(x), Some(y)) if x == y => continue,
            (Some(_), Some(_)) => Operation::UPDATE,
            (None, _) => Operation::CREATE,
            (_, None) => Operation::DELETE,
        };
        change.push(difference(
            format!("{}Meta.Annotations[{}]", prefix, key),
            a.map_or(NIL, String::as_str),
            b.map_or(NIL, String::as_str),
            kind,
            key,
            operation,
        ));
    }
    Ok(())
}

fn misaligned(change: &Change, prefix: &str, field: &str, from: &str, to: &str) -> InsprError {
    InsprError::DiffMisaligned {
        context: change.context.clone(),
        field: format!("{}{}", prefix, field),
        from: from.to_string(),
        to: to.to_string(),
    }
}

fn diff_node(change: &mut Change, from: Option<&Node>, to: Option<&Node>) {
    let (from, to) = match (from, to) {
        (None, None) => return,
        (Some(_), None) | (None, Some(_)) => {
            let (a, b, op) = if from.is_some() {
                (PRESENT, NIL, Operation::DELETE)
            } else {
                (NIL, PRESENT, Operation::CREATE)
            };
            change.push(difference("Spec.Node".to_string(), a, b, Kind::NODE, "", op));
            return;
        }
        (Some(a), Some(b)) => (a, b),
    };

    if from.spec.image != to.spec.image {
        change.push(difference(
            "Spec.Node.Spec.Image".to_string(),
            from.spec.image.as_str(),
            to.spec.image.as_str(),
            Kind::NODE,
            "",
            Operation::UPDATE,
        ));
    }
    if from.spec.replicas != to.spec.replicas {
        change.push(difference(
            "Spec.Node.Spec.Replicas".to_string(),
            from.spec.replicas.to_string(),
            to.spec.replicas.to_string(),
            Kind::NODE,
            "",
            Operation::UPDATE,
        ));
    }
    if from.spec.ports != to.spec.ports {
        let render = |ports: &[u16]| {
            ports
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        change.push(difference(
            "Spec.Node.Spec.Ports".to_string(),
            render(&from.spec.ports),
            render(&to.spec.ports),
            Kind::NODE,
            "",
            Operation::UPDATE,
        ));
    }

    let env_from = &from.spec.environment;
    let env_to = &to.spec.environment;
    let keys: BTreeSet<&String> = env_from.keys().chain(env_to.keys()).collect();
    for key in keys {
        let (a, b) = (env_from.get(key), env_to.get(key));
        let operation = match (a, b) {
            (Some(x), Some(y)) if x == y => continue,
            (Some(_), Some(_)) => Operation::UPDATE,
            (None, _) => Operation::CREATE,
            (_, None) => Operation::DELETE,
        };
        change.push(difference(
            format!("Spec.Node.Spec.Environment[{}]", key),
            a.map_or(NIL, String::as_str),
            b.map_or(NIL, String::as_str),
            Kind::NODE | Kind::ENVIRONMENT,
            key,
            operation,
        ));
    }
}

fn diff_presence(change: &mut Change, field: &str, kind: Kind, removed: &[&str], added: &[&str]) {
    for name in removed {
        change.push(difference(
            format!("{}[{}]", field, name),
            PRESENT,
            NIL,
            kind,
            name,
            Operation::DELETE,
        ));
    }
    for name in added {
        change.push(difference(
            format!("{}[{}]", field, name),
            NIL,
            PRESENT,
            kind,
            name,
            Operation::CREATE,
        ));
    }
}

fn diff_apps(change: &mut Change, from: &BTreeMap<String, App>, to: &BTreeMap<String, App>) {
    let (removed, added, _) = partition(from, to);
    diff_presence(change, "Spec.Apps", Kind::APP, &removed, &added);
}

fn diff_channels(
    change: &mut Change,
    from: &BTreeMap<String, Channel>,
    to: &BTreeMap<String, Channel>,
) -> Result<()> {
    let (removed, added, common) = partition(from, to);
    diff_presence(change, "Spec.Channels", Kind::CHANNEL, &removed, &added);

    for name in common {
        let (a, b) = (&from[name], &to[name]);
        if a.spec.type_name != b.spec.type_name {
            change.push(difference(
                format!("Spec.Channels[{}].Spec.Type", name),
                a.spec.type_name.as_str(),
                b.spec.type_name.as_str(),
                Kind::CHANNEL,
                name,
                Operation::UPDATE,
            ));
        }
        if a.spec.selected_broker != b.spec.selected_broker {
            change.push(difference(
                format!("Spec.Channels[{}].Spec.SelectedBroker", name),
                a.spec.selected_broker.as_str(),
                b.spec.selected_broker.as_str(),
                Kind::CHANNEL,
                name,
                Operation::UPDATE,
            ));
        }
        diff_metadata(
            change,
            Kind::CHANNEL,
            name,
            &format!("Spec.Channels[{}].", name),
            &a.meta,
            &b.meta,
        )?;
    }
    Ok(())
}

fn diff_types(
    change: &mut Change,
    from: &BTreeMap<String, ChannelType>,
    to: &BTreeMap<String, ChannelType>,
) -> Result<()> {
    let (removed, added, common) = partition(from, to);
    diff_presence(change, "Spec.Types", Kind::TYPE, &removed, &added);

    for name in common {
        let (a, b) = (&from[name], &to[name]);
        if a.schema != b.schema {
            change.push(difference(
                format!("Spec.Types[{}].Schema", name),
                a.schema.as_str(),
                b.schema.as_str(),
                Kind::TYPE,
                name,
                Operation::UPDATE,
            ));
        }
        diff_metadata(
            change,
            Kind::TYPE,
            name,
            &format!("Spec.Types[{}].", name),
            &a.meta,
            &b.meta,
        )?;
    }
    Ok(())
}

fn diff_boundary(change: &mut Change, from: &Boundary, to: &Boundary) {
    let sides = [
        ("Spec.Boundary.Input", &from.input, &to.input),
        ("Spec.Boundary.Output", &from.output, &to.output),
    ];
    for (field, a, b) in sides {
        let a: BTreeSet<&str> = a.iter().map(String::as_str).collect();
        let b: BTreeSet<&str> = b.iter().map(String::as_str).collect();
        for name in a.difference(&b) {
            change.push(difference(
                field.to_string(),
                *name,
                NIL,
                Kind::BOUNDARY,
                name,
                Operation::DELETE,
            ));
        }
        for name in b.difference(&a) {
            change.push(difference(
                field.to_string(),
                NIL,
                *name,
                Kind::BOUNDARY,
                name,
                Operation::CREATE,
            ));
        }
    }
}

fn diff_aliases(change: &mut Change, from: &BTreeMap<String, Alias>, to: &BTreeMap<String, Alias>) {
    let (removed, added, common) = partition(from, to);
    for key in removed {
        change.push(difference(
            format!("Spec.Aliases[{}]", key),
            from[key].resource.as_str(),
            NIL,
            Kind::ALIAS,
            key,
            Operation::DELETE,
        ));
    }
    for key in added {
        change.push(difference(
            format!("Spec.Aliases[{}]", key),
            NIL,
            to[key].resource.as_str(),
            Kind::ALIAS,
            key,
            Operation::CREATE,
        ));
    }
    for key in common {
        let (a, b) = (&from[key], &to[key]);
        if a.resource != b.resource {
            change.push(difference(
                format!("Spec.Aliases[{}]", key),
                a.resource.as_str(),
                b.resource.as_str(),
                Kind::ALIAS,
                key,
                Operation::UPDATE,
            ));
        }
    }
}
