//! Name, scope and structural validation rules

pub mod invariants;
pub mod names;
pub mod scope;
pub mod validation;

pub use names::{alias_name_is_valid, structure_name_is_valid};
pub use scope::{is_valid_scope, join_scopes, split_last};
pub use validation::validate_app_subtree;
