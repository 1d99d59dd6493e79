//! Core error model.

use thiserror::Error;

/// Result type used across the core layer.
pub type CoreResult<T> = Result<T, CoreError>;

/// Core-level error.
///
/// Keep this focused on deterministic input failures. I/O concerns belong in
/// `smartair-infra`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The city is not one of the supported cities.
    #[error("unknown city: {0}")]
    UnknownCity(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl CoreError {
    pub fn unknown_city(city: impl Into<String>) -> Self {
        Self::UnknownCity(city.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
