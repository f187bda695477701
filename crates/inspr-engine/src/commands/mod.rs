//! Command orchestration layer.
//!
//! Provides the request-scoped entry points that drive the tree store and
//! the read tools consumed by the deployment converter.

pub mod engine_command;
pub mod node_env;
