//! Structured logging facility for the Inspr control plane
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Every manager operation and every transaction boundary emits a start
//! event followed by exactly one of an end or an end_error event.
//!
//! # Usage
//!
//! ```rust
//! use inspr_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
