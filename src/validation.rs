//! Field checks shared by the data services. Lengths count characters, not bytes.

use crate::error::{AppError, AppResult};

/// Trimmed, non-empty, at most `max` characters
pub fn required_text(field: &str, value: &str, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", field)));
    }
    check_max(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Trimmed and at most `max` characters; blank becomes `None`
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> AppResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_max(field, trimmed, max)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn check_max(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
