use crate::errors::{InsprError, Result};

/// Longest identifier accepted for any entity
pub const MAX_NAME_LEN: usize = 63;

/// Validate an entity name
///
/// 1 to 63 characters; alphanumeric at both ends; alphanumerics, `-` and `_`
/// inside.
///
/// # Errors
///
/// `InvalidName` describing the first violated rule.
pub fn structure_name_is_valid(name: &str) -> Result<()> {
    let invalid = |reason: &str| InsprError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name is longer than 63 characters"));
    }

    let bytes = name.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_alphanumeric();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) {
        return Err(invalid("name must start and end with an alphanumeric character"));
    }
    if !bytes
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
    {
        return Err(invalid(
            "name may only contain alphanumeric characters, '-' and '_'",
        ));
    }
    Ok(())
}

/// Validate an alias key of the form `<child>.<boundary>`
///
/// # Errors
///
/// `InvalidName` when the key does not have exactly two valid parts.
pub fn alias_name_is_valid(name: &str) -> Result<()> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() != 2 {
        return Err(InsprError::InvalidName {
            name: name.to_string(),
            reason: "alias name must have the form '<dApp>.<boundary>'".to_string(),
        });
    }
    parts.iter().try_for_each(|p| structure_name_is_valid(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        let longest = "x".repeat(63);
        for name in ["a", "app1", "my-app", "my_app", "A9", longest.as_str()] {
            assert!(structure_name_is_valid(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_invalid_names() {
        let too_long = "x".repeat(64);
        for name in ["", "-app", "app-", "_app", "app_", "ap.p", "ap p", too_long.as_str()] {
            assert!(structure_name_is_valid(name).is_err(), "{name}");
        }
    }

    #[test]
    fn test_alias_names() {
        assert!(alias_name_is_valid("app1.input").is_ok());
        assert!(alias_name_is_valid("app1").is_err());
        assert!(alias_name_is_valid("a.b.c").is_err());
        assert!(alias_name_is_valid("app1.-x").is_err());
    }
}
