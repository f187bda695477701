//! Resolve command
//!
//! Usage: inspr resolve <PATHS>... --scope <APP>

use std::path::PathBuf;

use clap::Args;
use inspr_core::{AppGetter, InsprConfig};
use inspr_engine::node_environment;

use super::load_store;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Manifest files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Dotted path of the dApp
    #[arg(long)]
    pub scope: String,
}

/// Execute resolve command
pub fn execute(args: ResolveArgs, config: &InsprConfig) -> anyhow::Result<()> {
    let store = load_store(config, &args.paths)?;
    let perm = store.perm();
    let app = perm.get_app(&args.scope)?;

    println!("boundary:");
    for (entry, resolved) in perm.resolve_channels(app)? {
        println!("  {} -> {}", entry, resolved.path);
    }

    if app.has_node() {
        let env = node_environment(&perm, &args.scope)?;
        println!("environment:");
        for (key, value) in &env.vars {
            println!("  {}={}", key, value);
        }
    }
    Ok(())
}
