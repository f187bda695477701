//! Apply command
//!
//! Usage: inspr apply <PATHS>... [--dry-run] [--json]

use std::path::PathBuf;

use clap::Args;
use inspr_core::diff::render;
use inspr_core::{InsprConfig, TreeStore};
use inspr_manifest::{import_manifests, load_manifest_paths, ApplyAction};

use super::display_path;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Manifest files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Report the changes and cancel instead of committing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the changelog as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute apply command
pub fn execute(args: ApplyArgs, config: &InsprConfig) -> anyhow::Result<()> {
    let manifests = load_manifest_paths(&args.paths)?;
    let store = TreeStore::from_config(config);
    let mut tx = store.init_transaction()?;

    let applied = import_manifests(&mut tx, &manifests)?;
    let changelog = tx.changes()?;

    for a in &applied {
        let action = match a.action {
            ApplyAction::Created => "created",
            ApplyAction::Updated => "updated",
        };
        println!("{} {} {}", action, a.kind, display_path(&a.scope, &a.name));
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&changelog)?);
    } else {
        print!("{}", render(&changelog));
    }

    if args.dry_run {
        tx.cancel();
        println!("dry run: nothing committed");
    } else {
        let id = tx.id();
        tx.commit();
        println!("committed {}", id);
    }
    Ok(())
}
