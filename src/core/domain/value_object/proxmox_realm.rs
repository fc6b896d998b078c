use crate::core::domain::error::ValidationError;

/// A validated authentication realm identifier (e.g. `pam`, `pve`, an LDAP realm id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxRealm(String);

impl ProxmoxRealm {
    /// Creates a new realm without validation.
    pub(crate) fn new_unchecked(realm: String) -> Self {
        Self(realm)
    }

    /// Returns the realm as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a realm id. Realm ids are user defined on the server, so only the
/// character set and length are checked here.
pub(crate) fn validate_realm(realm: &str) -> Result<(), ValidationError> {
    if realm.is_empty() {
        return Err(ValidationError::field("realm", "Realm cannot be empty"));
    }
    if realm.len() < 2 || realm.len() > 32 {
        return Err(ValidationError::Format(
            "Realm length must be between 2 and 32 characters".to_string(),
        ));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_';
    if !realm.chars().all(allowed) {
        return Err(ValidationError::Format(
            "Realm contains invalid characters".to_string(),
        ));
    }
    if !realm.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(ValidationError::Format(
            "Realm must start with a letter".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_realms() {
        for realm in ["pam", "pve", "ldap", "corp-ad", "ad_01"] {
            assert!(validate_realm(realm).is_ok(), "Realm {realm} should be valid");
        }
    }

    #[test]
    fn test_invalid_realms() {
        let test_cases = vec![
            ("", "empty realm"),
            ("a", "too short"),
            ("PAM", "wrong case"),
            ("pve@domain", "invalid characters"),
            ("1pam", "leading digit"),
        ];
        for (realm, case) in test_cases {
            assert!(
                validate_realm(realm).is_err(),
                "Case '{case}' should fail validation: {realm}"
            );
        }
    }
}
