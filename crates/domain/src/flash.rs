//! Flash messages: one-time status notices shown after an action.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity category of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    #[default]
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    /// Parse a category name. Unknown categories (including the generic
    /// `"message"`) fall back to [`FlashLevel::Info`].
    #[must_use]
    pub fn from_category(category: &str) -> Self {
        match category {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "error" | "danger" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Visual severity class used by the templates.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "danger",
        }
    }
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Info => f.write_str("info"),
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A single queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, message)
    }
}
