use serde::{Deserialize, Serialize};

use crate::services::seating::generate_identity;

const MAX_IDENTITY_LEN: usize = 64;

/// Request to join a room
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    /// Identity to join with; reconnecting callers send their previous one
    #[serde(default)]
    pub identity: Option<String>,
}

impl JoinRoomRequest {
    /// Validate and clean a caller-supplied identity
    ///
    /// # Arguments
    ///
    /// * `identity` - Raw identity input
    ///
    /// # Returns
    ///
    /// Cleaned identity if valid, error message otherwise
    ///
    /// # Validation Rules
    ///
    /// - Must not be empty after trimming
    /// - Length: 1-64 characters
    /// - No control characters
    pub fn validate_identity(identity: &str) -> Result<String, String> {
        let cleaned = identity.trim();

        if cleaned.is_empty() {
            return Err("Identity cannot be empty".to_string());
        }

        if cleaned.chars().count() > MAX_IDENTITY_LEN {
            return Err(format!(
                "Identity must be {} characters or less",
                MAX_IDENTITY_LEN
            ));
        }

        if cleaned.chars().any(char::is_control) {
            return Err("Identity must not contain control characters".to_string());
        }

        Ok(cleaned.to_string())
    }

    /// The identity to join with, generating one if none was sent
    pub fn resolve_identity(&self) -> Result<String, String> {
        match self.identity.as_deref().map(str::trim) {
            Some(identity) if !identity.is_empty() => Self::validate_identity(identity),
            _ => Ok(generate_identity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identity_trims() {
        assert_eq!(
            JoinRoomRequest::validate_identity("  alice ").unwrap(),
            "alice"
        );
    }

    #[test]
    fn test_validate_identity_rejects_bad_input() {
        assert!(JoinRoomRequest::validate_identity("   ").is_err());
        assert!(JoinRoomRequest::validate_identity(&"x".repeat(65)).is_err());
        assert!(JoinRoomRequest::validate_identity("a\nb").is_err());
    }

    #[test]
    fn test_resolve_identity_generates_when_missing() {
        let missing = JoinRoomRequest { identity: None };
        let blank = JoinRoomRequest {
            identity: Some("  ".to_string()),
        };

        assert!(missing.resolve_identity().unwrap().starts_with("u_"));
        assert!(blank.resolve_identity().unwrap().starts_with("u_"));
    }

    #[test]
    fn test_resolve_identity_keeps_supplied_value() {
        let request = JoinRoomRequest {
            identity: Some("bob".to_string()),
        };

        assert_eq!(request.resolve_identity().unwrap(), "bob");
    }
}
