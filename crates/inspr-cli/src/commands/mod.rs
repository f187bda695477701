//! Subcommands and the helpers they share

pub mod apply;
pub mod diff;
pub mod resolve;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::Context;
use inspr_core::{InsprConfig, TreeStore};
use inspr_manifest::{import_manifests, load_manifest_paths};

/// Load the configuration file (or defaults), add `extra_brokers`, then
/// apply `INSPR_*` environment overrides
pub fn load_config(path: Option<&Path>, extra_brokers: &[String]) -> anyhow::Result<InsprConfig> {
    let mut config = match path {
        Some(p) => InsprConfig::from_file(p)
            .with_context(|| format!("loading configuration from {}", p.display()))?,
        None => InsprConfig::default(),
    };
    for broker in extra_brokers {
        if !config.brokers.available.contains(broker) {
            config.brokers.available.push(broker.clone());
        }
    }
    Ok(config.with_env_overrides()?)
}

/// Build a store whose committed tree holds every manifest under `paths`
pub fn load_store(config: &InsprConfig, paths: &[PathBuf]) -> anyhow::Result<TreeStore> {
    let manifests = load_manifest_paths(paths)?;
    let store = TreeStore::from_config(config);
    let mut tx = store.init_transaction()?;
    import_manifests(&mut tx, &manifests)?;
    tx.commit();
    Ok(store)
}

/// `scope.name`, or `name` at the root
pub fn display_path(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}
