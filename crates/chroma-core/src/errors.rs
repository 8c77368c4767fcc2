//! Error types for Chroma.
//!
//! Two categories matter to the search itself: configuration errors raised
//! when an engine is built with invalid parameters, and invalid-argument
//! errors raised when an operator's precondition is violated by the caller.
//! The remaining variants belong to the graph I/O collaborators.

use thiserror::Error;

/// Unified error type for all Chroma operations.
#[derive(Error, Debug)]
pub enum ChromaError {
    /// Invalid construction parameters (rates, sizes, color budget)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Caller violated an operator precondition (e.g. coloring length mismatch)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed graph input (edge list or DIMACS content)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// I/O errors (graph files, coloring output, telemetry)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic errors (fallback)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChromaError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ChromaError::ConfigError(message.into())
    }

    /// Creates an invalid-argument (precondition violation) error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ChromaError::InvalidArgument(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ChromaError::ValidationError(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ChromaError::Internal(message.into())
    }

    /// Returns true for errors that indicate a bug in the calling code rather
    /// than bad external input.
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            ChromaError::ConfigError(_) | ChromaError::InvalidArgument(_)
        )
    }

    /// Returns a user-friendly error message with actionable guidance.
    pub fn user_message(&self) -> String {
        match self {
            ChromaError::ConfigError(msg) => {
                format!(
                    "Configuration error: {}\n\
                     → Rates must lie in [0, 1], population_size >= 2, max_colors >= 1.\n\
                     → tournament_size must lie in [1, population_size].",
                    msg
                )
            }
            ChromaError::ValidationError(msg) => {
                format!(
                    "Validation error: {}\n\
                     → Edge lists start with the vertex count, then one 'u v' pair per line.\n\
                     → DIMACS files need a 'p edge N M' line before any 'e U V' line.",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for Chroma operations.
pub type Result<T> = std::result::Result<T, ChromaError>;
