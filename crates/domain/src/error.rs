//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MaintrackError`] via `#[from]`.

/// Top-level error for domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum MaintrackError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A submitted value broke a domain invariant.
///
/// The `Display` output is shown to users verbatim in flash messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be a whole number, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("{field} must be one of {allowed}, got {value:?}")]
    NotAllowed {
        field: &'static str,
        allowed: &'static str,
        value: String,
    },

    #[error("{value:?} is not a valid email address")]
    InvalidEmail { value: String },

    #[error("{field} must be a date formatted as YYYY-MM-DD, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} refers to an unknown {entity} ({id})")]
    UnknownReference {
        field: &'static str,
        entity: &'static str,
        id: String,
    },

    #[error("{field} {value:?} is already taken")]
    Duplicate { field: &'static str, value: String },
}

/// A record looked up by id does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Require a non-blank string, returning it trimmed.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] when `value` is empty or whitespace.
pub fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping blank input to `None`.
#[must_use]
pub fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse an integer form value and check it lies in `min..=max`.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for blank input,
/// [`ValidationError::NotANumber`] when parsing fails, and
/// [`ValidationError::OutOfRange`] when the number is outside the range.
pub fn ranged(field: &'static str, value: &str, min: i64, max: i64) -> Result<i64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    let parsed: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: trimmed.to_string(),
    })?;
    if !(min..=max).contains(&parsed) {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value: parsed,
        });
    }
    Ok(parsed)
}
