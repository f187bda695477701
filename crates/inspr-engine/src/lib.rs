//! Inspr Engine - Orchestration layer
//!
//! Runs request-scoped commands against a tree store: each command (or
//! batch) opens one transaction, calls the managers, and either commits
//! and returns the changelog or cancels. Also exposes read tools used when
//! turning a dApp node into a deployment.

pub mod commands;
pub mod errors;

pub use commands::engine_command::{
    apply_batch, apply_engine_command, EngineCommand, EngineCommandResult,
};
pub use commands::node_env::{node_environment, NodeEnvironment};
