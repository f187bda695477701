//! Error helpers for inspr-engine
//!
//! The engine reports canonical `ExError`s tagged with the failing op and
//! the request that drove it.

use inspr_core::errors::{ExError, InsprError};
use inspr_core_types::RequestContext;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Tag a manager or store error with the engine op and request id
pub fn command_failed(op: &str, ctx: &RequestContext, err: InsprError) -> ExError {
    ExError::from(err)
        .with_op(op.to_string())
        .with_request_id(ctx.request_id.clone())
}

/// Wrap the error of one command inside a batch
pub fn batch_failed(index: usize, ctx: &RequestContext, inner: ExError) -> ExError {
    ExError::new(inner.kind())
        .with_op("engine_batch")
        .with_request_id(ctx.request_id.clone())
        .with_message(format!("command {} of the batch failed", index))
        .with_source(inner)
}
