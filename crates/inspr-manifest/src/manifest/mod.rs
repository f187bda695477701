//! Manifest import system
//!
//! Provides:
//! - Manifest document schema
//! - YAML parser with validation
//! - Digest canonicalization
//! - Importer applying documents through the tree managers

pub mod digest;
pub mod format;
pub mod importer;
pub mod parser;

pub use digest::compute_manifest_digest;
pub use format::Manifest;
pub use importer::{import_manifests, Applied, ApplyAction};
pub use parser::{load_manifest_paths, parse_manifest_file, parse_manifest_str};
