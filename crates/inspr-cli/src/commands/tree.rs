//! Tree command
//!
//! Usage: inspr tree <PATHS>... [--scope <APP>]

use std::path::PathBuf;

use clap::Args;
use inspr_core::{AppGetter, InsprConfig};

use super::load_store;

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Manifest files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print only this dApp's subtree
    #[arg(long, default_value = "")]
    pub scope: String,
}

/// Execute tree command
pub fn execute(args: TreeArgs, config: &InsprConfig) -> anyhow::Result<()> {
    let store = load_store(config, &args.paths)?;
    let perm = store.perm();
    let app = perm.get_app(&args.scope)?;
    println!("{}", serde_json::to_string_pretty(app)?);
    Ok(())
}
