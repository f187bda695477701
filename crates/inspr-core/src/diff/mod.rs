//! Structural diff of dApp trees.
//!
//! ```
//! use inspr_core::diff::{diff, render};
//! use inspr_core::model::App;
//!
//! let before = App::default();
//! let after = App::default().with_app(App::new("x"));
//! let changelog = diff(&before, &after).unwrap();
//! print!("{}", render(&changelog));
//! ```
//!
//! Comparing trees whose names or parents differ at some level is an
//! error rather than a recorded difference.

pub mod engine;
pub mod model;
pub mod render;

pub use engine::{diff, ROOT_CONTEXT};
pub use model::{
    Change, ChangeOperation, Changelog, Difference, DifferenceOperation, Kind, Operation, NIL,
    PRESENT,
};
pub use render::render;
