use crate::core::domain::error::ValidationError;

/// Name the API uses for the live state pseudo-entry in snapshot lists.
pub const CURRENT_STATE: &str = "current";

/// Validates a snapshot name the way the server does: a letter followed by
/// 1 to 39 alphanumerics, `_` or `-`.
pub(crate) fn validate_snapshot_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::field("snapshot", "Snapshot name cannot be empty"));
    }
    if name == CURRENT_STATE {
        return Err(ValidationError::ConstraintViolation(
            "'current' is the live guest state and cannot be deleted".to_string(),
        ));
    }
    if name.len() < 2 || name.len() > 40 {
        return Err(ValidationError::Format(
            "Snapshot name length must be between 2 and 40 characters".to_string(),
        ));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(ValidationError::Format(
            "Snapshot name must start with a letter".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::Format(
            "Snapshot name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_snapshot_names() {
        for name in ["Update_20250418_141936", "Before_reinstall_Z2M", "pre-upgrade"] {
            assert!(validate_snapshot_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_snapshot_names() {
        for name in ["", "current", "1st", "a", "has space", "../etc", &"a".repeat(41)] {
            assert!(validate_snapshot_name(name).is_err(), "{name} should be invalid");
        }
    }
}
