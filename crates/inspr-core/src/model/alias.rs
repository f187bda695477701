use serde::{Deserialize, Serialize};

use super::metadata::Metadata;

/// Re-points a child dApp's boundary entry to a resource of the owner
///
/// Lives in the alias map of the dApp owning `resource`, keyed
/// `"<child>.<boundary>"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Alias {
    pub meta: Metadata,

    /// Channel or boundary entry of the owning dApp
    #[serde(alias = "target")]
    pub resource: String,

    /// Child-local boundary name being re-pointed
    pub source: String,

    /// Child dApp the alias is scoped to
    pub destination: String,
}

impl Alias {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Default::default()
        }
    }

    /// Split a `"<child>.<boundary>"` key
    pub fn split_key(key: &str) -> Option<(&str, &str)> {
        key.split_once('.')
    }

    pub fn key(child: &str, boundary: &str) -> String {
        format!("{}.{}", child, boundary)
    }
}
