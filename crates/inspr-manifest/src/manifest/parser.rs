//! Manifest parser with validation
//!
//! Parses multi-document YAML and validates kinds, scopes and names before
//! any tree is touched. Every accepted document has `meta.sha256` stamped
//! with its content digest when it doesn't carry one.

use std::fs;
use std::path::{Path, PathBuf};

use inspr_core::rules::{alias_name_is_valid, is_valid_scope, structure_name_is_valid};
use serde::Deserialize;

use crate::errors::{io_error, manifest_validation, Result};

use super::digest::compute_manifest_digest;
use super::format::Manifest;

/// Parse a manifest file from a path
///
/// # Errors
///
/// `Io` when the file can't be read, `InvalidManifest` when a document is
/// malformed.
pub fn parse_manifest_file(path: &Path) -> Result<Vec<Manifest>> {
    let content = fs::read_to_string(path).map_err(|e| io_error("manifest_read", e))?;

    parse_manifest_str(&content)
        .map_err(|e| e.with_entity(path.display().to_string()))
}

/// Parse every document of a YAML string
///
/// Empty documents are skipped.
///
/// # Errors
///
/// `InvalidManifest` naming the first malformed document.
pub fn parse_manifest_str(content: &str) -> Result<Vec<Manifest>> {
    let mut manifests = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let parsed = Option::<Manifest>::deserialize(document).map_err(|e| {
            manifest_validation(&format!("YAML parse error in document {}: {}", index, e))
        })?;
        let Some(mut manifest) = parsed else {
            continue;
        };

        validate_manifest(&manifest)
            .map_err(|reason| manifest_validation(&format!("document {}: {}", index, reason)))?;

        if manifest.meta_mut().sha256.is_empty() {
            let digest = compute_manifest_digest(&manifest);
            manifest.meta_mut().sha256 = digest;
        }
        manifests.push(manifest);
    }

    Ok(manifests)
}

/// Parse manifests from files and directories, in argument order
///
/// Directories contribute their `.yaml`/`.yml` files sorted by name; they
/// are not searched recursively.
///
/// # Errors
///
/// `Io` or `InvalidManifest` for the first path that fails.
pub fn load_manifest_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Manifest>> {
    let mut manifests = Vec::new();
    for path in paths {
        for file in manifest_files(path.as_ref())? {
            manifests.extend(parse_manifest_file(&file)?);
        }
    }
    Ok(manifests)
}

fn manifest_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = fs::read_dir(path).map_err(|e| io_error("manifest_read_dir", e))?;
    let mut files = Vec::new();
    for entry in entries {
        let file = entry.map_err(|e| io_error("manifest_read_dir", e))?.path();
        let is_yaml = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if file.is_file() && is_yaml {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

/// Validate a parsed document
fn validate_manifest(manifest: &Manifest) -> std::result::Result<(), String> {
    let scope = manifest.scope();
    if !is_valid_scope(scope) {
        return Err(format!("invalid scope '{}'", scope));
    }

    match manifest {
        Manifest::Dapp { dapp, .. } => {
            structure_name_is_valid(&dapp.meta.name).map_err(|e| e.to_string())
        }
        Manifest::Channel { channel, .. } => {
            structure_name_is_valid(&channel.meta.name).map_err(|e| e.to_string())?;
            if channel.spec.type_name.is_empty() {
                return Err(format!("channel '{}' has no type", channel.meta.name));
            }
            Ok(())
        }
        Manifest::Type { channel_type, .. } => {
            structure_name_is_valid(&channel_type.meta.name).map_err(|e| e.to_string())
        }
        Manifest::Alias {
            scope,
            boundary,
            alias,
        } => {
            if scope.is_empty() {
                return Err("alias documents need the scope of the child dApp".to_string());
            }
            let child = scope.rsplit('.').next().unwrap_or(scope.as_str());
            alias_name_is_valid(&format!("{}.{}", child, boundary)).map_err(|e| e.to_string())?;
            if alias.resource.is_empty() {
                return Err(format!("alias for '{}' has no resource", boundary));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspr_core::errors::ExErrorKind;

    #[test]
    fn test_multi_document_parse() {
        let yaml = r#"
kind: type
type:
  meta:
    name: t1
  schema: "{}"
---
kind: channel
channel:
  meta:
    name: ch1
  spec:
    type: t1
---
"#;
        let docs = parse_manifest_str(yaml).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name(), "t1");
        assert_eq!(docs[1].name(), "ch1");
        match &docs[1] {
            Manifest::Channel { channel, .. } => assert_eq!(channel.spec.type_name, "t1"),
            other => panic!("expected channel, got {other:?}"),
        }
    }

    #[test]
    fn test_digest_is_stamped() {
        let yaml = "kind: type\ntype:\n  meta:\n    name: t1\n  schema: '{}'\n";
        let mut docs = parse_manifest_str(yaml).unwrap();
        assert_eq!(docs[0].meta_mut().sha256.len(), 64);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = parse_manifest_str("kind: secret\nscope: ''\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidManifest);
    }

    #[test]
    fn test_bad_name_rejected_before_import() {
        let yaml = "kind: dapp\ndapp:\n  meta:\n    name: -nope\n";
        let err = parse_manifest_str(yaml).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidManifest);
        assert!(err.message().contains("document 0"));
    }

    #[test]
    fn test_alias_needs_child_scope() {
        let yaml = "kind: alias\nscope: ''\nboundary: in\nalias:\n  resource: ch1\n";
        assert!(parse_manifest_str(yaml).is_err());
    }

    #[test]
    fn test_alias_accepts_target_spelling() {
        let yaml = "kind: alias\nscope: p.app1\nboundary: in\nalias:\n  target: ch1\n";
        let docs = parse_manifest_str(yaml).unwrap();
        match &docs[0] {
            Manifest::Alias { alias, .. } => assert_eq!(alias.resource, "ch1"),
            other => panic!("expected alias, got {other:?}"),
        }
    }
}
