//! Manifest digest canonicalization
//!
//! Computes stable SHA256 digests of manifest documents so re-applying an
//! unchanged file produces no difference.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::format::Manifest;

/// Compute a stable digest for a manifest document
///
/// The digest covers the whole document except the top-level entity's own
/// `meta.sha256`, so stamping it does not change it. Returns a lowercase
/// hex SHA256.
pub fn compute_manifest_digest(manifest: &Manifest) -> String {
    let mut unstamped = manifest.clone();
    unstamped.meta_mut().sha256.clear();

    // serde_json orders object keys, and every map in the model is a BTreeMap
    let canonical = serde_json::to_value(&unstamped)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| Value::Null.to_string());

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
