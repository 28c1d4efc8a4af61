//! Validation Utilities
//!
//! Request-body validation glue for the `validator` crate, plus the display-name
//! and description rules shared by chat and profile names.

use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Maximum display-name length, in characters.
pub const MAX_NAME_LENGTH: usize = 52;

/// Maximum chat description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 512;

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
            })
        })
        .collect();

    let message = field_errors
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation(message)
}

/// Validate a display name (chat names, profile names).
///
/// A name must be non-blank, between 1 and 52 characters, and must not contain
/// control characters in the C0 range (`0x00..=0x1F`).
pub fn validate_display_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be blank".into()));
    }

    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "name must be 1-{} characters, got {}",
            MAX_NAME_LENGTH, length
        )));
    }

    if name.chars().any(|c| (c as u32) <= 0x1F) {
        return Err(AppError::Validation(
            "name contains forbidden characters".into(),
        ));
    }

    Ok(())
}

/// Validate a free-text chat description.
///
/// Empty descriptions are fine. Line breaks and tabs are allowed, other control
/// characters are not.
pub fn validate_description(description: &str) -> Result<(), AppError> {
    let length = description.chars().count();
    if length > MAX_DESCRIPTION_LENGTH {
        return Err(AppError::Validation(format!(
            "description must be at most {} characters, got {}",
            MAX_DESCRIPTION_LENGTH, length
        )));
    }

    if description
        .chars()
        .any(|c| (c as u32) <= 0x1F && c != '\n' && c != '\t')
    {
        return Err(AppError::Validation(
            "description contains forbidden characters".into(),
        ));
    }

    Ok(())
}
