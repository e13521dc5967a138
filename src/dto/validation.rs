//! Validation helpers for DTOs.

use validator::ValidationError;

/// Usernames double as room names, so they must be printable and carry no
/// surrounding whitespace.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim() != username {
        let mut err = ValidationError::new("username_whitespace");
        err.message = Some("Username must not start or end with whitespace".into());
        return Err(err);
    }

    if username.chars().any(char::is_control) {
        let mut err = ValidationError::new("username_format");
        err.message = Some("Username must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("DJ Shadow").is_ok());
    }

    #[test]
    fn rejects_padding_and_control_characters() {
        assert!(validate_username(" alice").is_err());
        assert!(validate_username("alice\n").is_err());
        assert!(validate_username("al\u{7}ice").is_err());
    }
}
