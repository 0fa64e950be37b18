//! Validation Utilities

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use super::error::AppError;

/// Query parameters accepted by the WebSocket login endpoint.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginQuery {
    #[serde(default)]
    #[validate(length(min = 2, max = 20, message = "name must be 2-20 characters"))]
    pub name: String,
}

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let detail = e.message.clone().map(|m| m.to_string()).unwrap_or_default();
                format!("{}: {}", field, detail)
            })
        })
        .next()
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation(message)
}

/// Validate a login name (2-20 characters).
pub fn validate_username(name: &str) -> Result<(), AppError> {
    LoginQuery {
        name: name.to_string(),
    }
    .validate()
    .map_err(validation_error)
}
