//! Error types and handling for the `OutfitAI` backend

use thiserror::Error;

/// Main error type for the `OutfitAI` backend
#[derive(Error, Debug)]
pub enum OutfitAiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Calendar storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl OutfitAiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            OutfitAiError::Config { .. } => {
                "Configuration error. Please check your config file and auth key.".to_string()
            }
            OutfitAiError::Api { .. } => {
                "Unable to reach the weather service. Please try again later.".to_string()
            }
            OutfitAiError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            OutfitAiError::Storage { .. } => {
                "Failed to save your calendar. Please try again.".to_string()
            }
            OutfitAiError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            OutfitAiError::General { message } => message.clone(),
        }
    }
}
