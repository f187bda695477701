//! Diff command
//!
//! Usage: inspr diff <FROM> <TO> [--json]
//!
//! Each side is built in its own store, so generated UUIDs never match.
//! They are cleared before comparing; everything else is compared as is.

use std::path::PathBuf;

use clap::Args;
use inspr_core::diff::{diff, render};
use inspr_core::{App, InsprConfig};

use super::load_store;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Manifest file or directory describing the old tree
    pub from: PathBuf,

    /// Manifest file or directory describing the new tree
    pub to: PathBuf,

    /// Print the changelog as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute diff command
pub fn execute(args: DiffArgs, config: &InsprConfig) -> anyhow::Result<()> {
    let mut from = load_store(config, &[args.from])?.perm().root().clone();
    let mut to = load_store(config, &[args.to])?.perm().root().clone();
    clear_uuids(&mut from);
    clear_uuids(&mut to);

    let changelog = diff(&from, &to)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&changelog)?);
    } else if changelog.is_empty() {
        println!("no differences");
    } else {
        print!("{}", render(&changelog));
    }
    Ok(())
}

fn clear_uuids(app: &mut App) {
    app.meta.uuid.clear();
    if let Some(node) = app.spec.node.as_mut() {
        node.meta.uuid.clear();
    }
    for channel in app.spec.channels.values_mut() {
        channel.meta.uuid.clear();
    }
    for ty in app.spec.types.values_mut() {
        ty.meta.uuid.clear();
    }
    for alias in app.spec.aliases.values_mut() {
        alias.meta.uuid.clear();
    }
    for child in app.spec.apps.values_mut() {
        clear_uuids(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspr_core::{Alias, Channel, ChannelType, Node};

    #[test]
    fn test_clear_uuids_reaches_every_entity() {
        let mut child = App::new("child").with_node(Node::with_image("img"));
        child.meta.uuid = "a".to_string();
        if let Some(node) = child.spec.node.as_mut() {
            node.meta.uuid = "b".to_string();
        }
        let mut root = App::default()
            .with_type(ChannelType::new("t", "{}"))
            .with_channel(Channel::new("ch", "t"))
            .with_alias("child.in", Alias::new("ch"))
            .with_app(child);
        root.spec.channels.get_mut("ch").unwrap().meta.uuid = "c".to_string();

        clear_uuids(&mut root);

        let child = &root.spec.apps["child"];
        assert!(child.meta.uuid.is_empty());
        assert!(child.spec.node.as_ref().unwrap().meta.uuid.is_empty());
        assert!(root.spec.channels["ch"].meta.uuid.is_empty());
    }
}
