//! Dotted scope paths
//!
//! A scope names a dApp by the names on the path from the root, joined by
//! `.`. The empty scope is the root.

use super::names::structure_name_is_valid;
use crate::errors::{InsprError, Result};

/// Whether every dotted segment is a valid name (the empty scope is valid)
pub fn is_valid_scope(scope: &str) -> bool {
    scope.is_empty()
        || scope
            .split('.')
            .all(|part| structure_name_is_valid(part).is_ok())
}

/// Join two scopes, either of which may be empty
///
/// # Errors
///
/// `InvalidScope` when either side is malformed.
pub fn join_scopes(parent: &str, child: &str) -> Result<String> {
    for s in [parent, child] {
        if !is_valid_scope(s) {
            return Err(InsprError::InvalidScope {
                scope: s.to_string(),
            });
        }
    }
    Ok(match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (_, true) => parent.to_string(),
        _ => format!("{}.{}", parent, child),
    })
}

/// Split a scope into its parent scope and last name
///
/// `"a.b.c"` yields `("a.b", "c")`; `"a"` yields `("", "a")`.
///
/// # Errors
///
/// `InvalidScope` for the root scope or a malformed one.
pub fn split_last(scope: &str) -> Result<(String, String)> {
    if scope.is_empty() || !is_valid_scope(scope) {
        return Err(InsprError::InvalidScope {
            scope: scope.to_string(),
        });
    }
    Ok(match scope.rsplit_once('.') {
        Some((parent, last)) => (parent.to_string(), last.to_string()),
        None => (String::new(), scope.to_string()),
    })
}

/// Build a scope from its segments, skipping empty ones
pub fn scope_from_parts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_scopes() {
        assert!(is_valid_scope(""));
        assert!(is_valid_scope("app1"));
        assert!(is_valid_scope("app1.app2"));
        assert!(!is_valid_scope("app1..app2"));
        assert!(!is_valid_scope(".app1"));
        assert!(!is_valid_scope("app1."));
    }

    #[test]
    fn test_join_scopes() {
        assert_eq!(join_scopes("", "a").unwrap(), "a");
        assert_eq!(join_scopes("a", "").unwrap(), "a");
        assert_eq!(join_scopes("a.b", "c").unwrap(), "a.b.c");
        assert!(join_scopes("a..b", "c").is_err());
    }

    #[test]
    fn test_split_last() {
        assert_eq!(
            split_last("a.b.c").unwrap(),
            ("a.b".to_string(), "c".to_string())
        );
        assert_eq!(split_last("a").unwrap(), (String::new(), "a".to_string()));
        assert!(split_last("").is_err());
    }

    #[test]
    fn test_scope_from_parts() {
        assert_eq!(scope_from_parts(["", "a", "b"]), "a.b");
        assert_eq!(scope_from_parts(Vec::<String>::new()), "");
    }
}
