//! Inspr Manifest - YAML manifests for the dApp tree
//!
//! Provides:
//! - The manifest document format (`kind: dapp | channel | type | alias`)
//! - A multi-document YAML parser with validation
//! - Content digests stamped into `meta.sha256`
//! - Import of parsed manifests into an open transaction

pub mod errors;
pub mod manifest;

pub use errors::Result;
pub use manifest::{
    compute_manifest_digest, import_manifests, load_manifest_paths, parse_manifest_file,
    parse_manifest_str, Applied, ApplyAction, Manifest,
};
