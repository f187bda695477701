//! Inspr CLI
//!
//! Offline tooling over dApp manifests: apply them to an in-memory tree,
//! compare two manifest sets, resolve boundaries, and print the tree.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "inspr")]
#[command(about = "Inspr - dApp control plane tooling", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Make a broker available (repeatable); added to the configured list
    #[arg(long = "broker", global = true)]
    brokers: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply manifests to a fresh tree and print the changes
    Apply(commands::apply::ApplyArgs),
    /// Compare the trees built from two manifest sets
    Diff(commands::diff::DiffArgs),
    /// Print the resolved boundary and node environment of a dApp
    Resolve(commands::resolve::ResolveArgs),
    /// Print the tree built from manifests as JSON
    Tree(commands::tree::TreeArgs),
}

fn main() {
    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref(), &cli.brokers) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    if let Ok(profile) = config.logging_profile() {
        inspr_core::logging_facility::init(profile);
    }

    let result = match cli.command {
        Commands::Apply(args) => commands::apply::execute(args, &config),
        Commands::Diff(args) => commands::diff::execute(args, &config),
        Commands::Resolve(args) => commands::resolve::execute(args, &config),
        Commands::Tree(args) => commands::tree::execute(args, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
