//! Core types shared across the Inspr control-plane crates
//!
//! - **Correlation types**: `RequestId`, `TransactionId`, `RequestContext`
//! - **Schema constants**: canonical structured-logging field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TransactionId};
