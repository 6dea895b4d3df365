//! Core error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid configuration for '{field}': {message}")]
    Config { field: String, message: String },

    #[error("Invalid quantity '{value}': {reason}")]
    QuantityParse { value: String, reason: String },
}

impl CoreError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn quantity(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::QuantityParse {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
