use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identity attached to every named entity in the tree
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Unique within the owning scope
    pub name: String,

    /// Display path
    pub reference: String,

    /// Dotted scope of the owning dApp; empty for entities owned by the root
    pub parent: String,

    pub annotations: BTreeMap<String, String>,

    /// Assigned once at creation, preserved across updates
    pub uuid: String,

    pub sha256: String,
}

impl Metadata {
    /// Metadata carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Replace the UUID with a freshly generated one
    pub fn inject_uuid(&mut self) {
        self.uuid = Uuid::new_v4().to_string();
    }

    /// Whether the UUID is in canonical hyphenated form
    pub fn has_valid_uuid(&self) -> bool {
        is_canonical_uuid(&self.uuid)
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// True when no identifying field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.parent.is_empty() && self.annotations.is_empty()
    }
}

/// Canonical 8-4-4-4-12 lowercase-or-uppercase hex UUID
pub fn is_canonical_uuid(s: &str) -> bool {
    s.len() == 36 && Uuid::try_parse(s).is_ok() && s.chars().filter(|c| *c == '-').count() == 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_uuid_is_canonical() {
        let mut meta = Metadata::named("ch1");
        assert!(!meta.has_valid_uuid());

        meta.inject_uuid();
        assert!(meta.has_valid_uuid());
    }

    #[test]
    fn test_canonical_uuid_rejects_simple_form() {
        assert!(!is_canonical_uuid("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(is_canonical_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!is_canonical_uuid(""));
    }

    #[test]
    fn test_empty_metadata() {
        assert!(Metadata::default().is_empty());
        assert!(!Metadata::named("x").is_empty());
        assert!(!Metadata::default().with_annotation("k", "v").is_empty());
    }
}
