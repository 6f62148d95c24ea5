//! Input validation for user-facing identifiers

use crate::error::{ConfidantError, Result};

/// Placeholder names that do not identify anyone
const RESERVED_NAMES: &[&str] = &[
    "anonymous",
    "anon",
    "guest",
    "user",
    "test",
    "temp",
    "unknown",
    "none",
    "null",
    "undefined",
    "???",
    "xxx",
];

/// Minimum name length in characters, after trimming
pub const MIN_NAME_LEN: usize = 2;

/// Validate a user name and return it trimmed.
///
/// The returned name is used as the memory owner identifier, so placeholders
/// that many people would share are refused.
pub fn validate_user_name(input: &str) -> Result<String> {
    let name = input.trim();

    if name.is_empty() {
        return Err(ConfidantError::Validation("Name cannot be empty".to_string()));
    }

    if name.chars().count() < MIN_NAME_LEN {
        return Err(ConfidantError::Validation(format!(
            "Name must be at least {} characters",
            MIN_NAME_LEN
        )));
    }

    let lowered = name.to_lowercase();
    if RESERVED_NAMES.contains(&lowered.as_str()) {
        return Err(ConfidantError::Validation(format!(
            "'{}' is a placeholder, please use a real name",
            name
        )));
    }

    Ok(name.to_string())
}
