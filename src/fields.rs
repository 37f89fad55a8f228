//! Small normalisers shared by the request DTOs.

use crate::errors::ApiError;

/// Trims free text; blank strings become `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn require_text(field: &str, value: &str) -> Result<String, ApiError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(v.to_string())
}

pub fn require_non_negative(field: &str, value: i64) -> Result<i64, ApiError> {
    if value < 0 {
        return Err(ApiError::BadRequest(format!("{field} must not be negative")));
    }
    Ok(value)
}

/// Money or volume: finite and not negative.
pub fn require_amount(field: &str, value: f64) -> Result<f64, ApiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::BadRequest(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(value)
}
