use std::fmt;
use thiserror::Error;

/// Error types for the identity bootstrap, using thiserror
#[derive(Error, Debug, Clone)]
pub enum IdentityError {
    // Widget related errors
    #[error("Identity widget '{name}' failed to initialize: {reason}")]
    WidgetInit {
        name: String,
        reason: String,
    },

    // Navigation related errors
    #[error("Navigation to '{target}' failed: {reason}")]
    NavigationFailed {
        target: String,
        reason: String,
    },

    // Configuration related errors
    #[error("Required configuration key '{key}' is missing")]
    ConfigMissing {
        key: String,
    },

    #[error("Invalid configuration value for '{key}': {reason}")]
    ConfigInvalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read configuration from '{path}': {reason}")]
    ConfigRead {
        path: String,
        reason: String,
    },

    #[error("Failed to parse configuration from '{path}': {reason}")]
    ConfigParse {
        path: String,
        reason: String,
    },
}

/// Type alias for identity results
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Module for error helper constructors
pub mod errors {
    use super::*;

    /// Create a widget initialization error
    pub fn widget_init(name: impl Into<String>, reason: impl fmt::Display) -> IdentityError {
        IdentityError::WidgetInit {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a navigation failed error
    pub fn navigation_failed(target: impl Into<String>, reason: impl fmt::Display) -> IdentityError {
        IdentityError::NavigationFailed {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration missing error
    pub fn config_missing(key: impl Into<String>) -> IdentityError {
        IdentityError::ConfigMissing {
            key: key.into(),
        }
    }

    /// Create a configuration invalid error
    pub fn config_invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> IdentityError {
        IdentityError::ConfigInvalid {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration read error
    pub fn config_read(path: impl Into<String>, reason: impl fmt::Display) -> IdentityError {
        IdentityError::ConfigRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration parse error
    pub fn config_parse(path: impl Into<String>, reason: impl fmt::Display) -> IdentityError {
        IdentityError::ConfigParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
