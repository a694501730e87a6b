//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest identifier accepted for umpires and event types.
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Validates an opaque identifier: 1 to 64 visible characters, no whitespace.
///
/// # Examples
///
/// ```ignore
/// validate_identifier("ump-042")   // Ok
/// validate_identifier("")          // Err - empty
/// validate_identifier("ump 42")    // Err - whitespace
/// ```
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
    let length = id.chars().count();
    if length == 0 || length > MAX_IDENTIFIER_LENGTH {
        let mut err = ValidationError::new("identifier_length");
        err.message = Some(
            format!(
                "Identifier must be between 1 and {MAX_IDENTIFIER_LENGTH} characters (got {length})"
            )
            .into(),
        );
        return Err(err);
    }

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        let mut err = ValidationError::new("identifier_format");
        err.message = Some("Identifier must not contain whitespace or control characters".into());
        return Err(err);
    }

    Ok(())
}
