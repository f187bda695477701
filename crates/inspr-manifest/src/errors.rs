//! Error handling for inspr-manifest
//!
//! Wraps inspr-core ExError with manifest-specific helpers

use inspr_core::errors::{ExError, ExErrorKind, InsprError};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a manifest validation error
pub fn manifest_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidManifest)
        .with_op("manifest_parse")
        .with_message(reason.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Wrap a tree error raised while importing one document
pub fn import_failed(index: usize, err: InsprError) -> ExError {
    let inner = ExError::from(err);
    ExError::new(inner.kind())
        .with_op("manifest_import")
        .with_message(format!("document {} could not be applied", index))
        .with_source(inner)
}
