//! Error types for the laytime calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Note that the calculation core itself never fails: malformed records
//! degrade to zero contributions and out-of-scope references become
//! warnings. These errors cover configuration loading and request
//! validation at the engine boundary.

use thiserror::Error;

/// The main error type for the laytime engine.
///
/// # Example
///
/// ```
/// use laytime_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/profile.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/profile.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A cargo or port call in the request belongs to a different voyage
    /// than the calculation it was submitted under.
    #[error("{entity} '{id}' does not belong to voyage '{voyage_id}'")]
    VoyageMismatch {
        /// The kind of record that mismatched ("cargo" or "port call").
        entity: String,
        /// The id of the mismatched record.
        id: String,
        /// The voyage the calculation is scoped to.
        voyage_id: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
