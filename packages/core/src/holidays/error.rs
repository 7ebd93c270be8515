//! Error types for holiday lookups

use thiserror::Error;

/// Errors surfaced by the holiday lookup pipeline.
///
/// `Clone` so a single outcome can be handed to every caller that joined
/// the same in-flight fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HolidayError {
    #[error("Upstream error: {message}")]
    Upstream { message: String, transient: bool },

    #[error("Circuit open: holiday API calls are suspended")]
    CircuitOpen,

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Deserialization error: {message}")]
    Deserialization { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl HolidayError {
    /// Timeouts, connection failures, 5xx and 429 responses.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            transient: true,
        }
    }

    /// Other 4xx responses and malformed payloads.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            transient: false,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization { message: message.into() }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache { message: message.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }

    /// Whether the retry policy may try again and the circuit breaker
    /// should count this failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Upstream { transient: true, .. })
    }

    /// Failures that mean the holiday service itself is unavailable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::CircuitOpen)
    }
}
