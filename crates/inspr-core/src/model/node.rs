use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::metadata::Metadata;

/// Leaf workload descriptor of a dApp
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub meta: Metadata,
    pub spec: NodeSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub image: String,
    pub replicas: u32,
    pub environment: BTreeMap<String, String>,
    pub ports: Vec<u16>,
}

impl Node {
    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            meta: Metadata::default(),
            spec: NodeSpec {
                image: image.into(),
                replicas: 1,
                ..Default::default()
            },
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.environment.insert(key.into(), value.into());
        self
    }

    /// A node counts as absent when it has no image and no identity
    pub fn is_empty(&self) -> bool {
        self.spec.image.is_empty() && self.meta.is_empty()
    }
}
