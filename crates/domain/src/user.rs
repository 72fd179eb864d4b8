//! User: an account that can log in and be assigned to sites.

use serde::{Deserialize, Serialize};

use crate::error::{MaintrackError, ValidationError};
use crate::id::UserId;

/// An application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    /// PHC-formatted password hash; never rendered.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Build a new user with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] when `username` is blank.
    pub fn new(
        username: impl Into<String>,
        full_name: Option<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, MaintrackError> {
        let user = Self {
            id: UserId::new(),
            username: username.into(),
            full_name,
            password_hash: password_hash.into(),
        };
        user.validate()?;
        Ok(user)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MaintrackError::Validation`] when `username` is blank.
    pub fn validate(&self) -> Result<(), MaintrackError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::Required { field: "username" }.into());
        }
        Ok(())
    }

    /// Full name when known, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}
