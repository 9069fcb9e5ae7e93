//! Error types for MeshDB Core
//!
//! Expected conditions (unknown node or transaction id, wrong transaction
//! state, no node hosting a database) are never errors here. They come back
//! as ordinary values from the coordinators. `Error` covers store faults and
//! rejected caller input only.

use thiserror::Error;

/// Result type alias using MeshDB Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for MeshDB
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors from file-backed stores
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode errors for stored collections
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store backend errors
    #[error("Store error: {0}")]
    Store(String),

    /// Caller supplied an unusable value (blank name, empty query, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog entity that must exist was not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Reject blank (empty or whitespace-only) caller input
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        assert!(matches!(Error::store("x"), Error::Store(_)));
        assert!(matches!(Error::invalid_input("x"), Error::InvalidInput(_)));
        assert!(matches!(Error::config("x"), Error::Config(_)));
        assert!(matches!(Error::not_found("x"), Error::NotFound(_)));
    }

    #[test]
    fn test_error_display() {
        let err = Error::invalid_input("name must not be empty");
        assert_eq!(err.to_string(), "Invalid input: name must not be empty");
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("name", "sales").is_ok());
        assert!(require_non_blank("name", "").is_err());
        assert!(require_non_blank("name", "   ").is_err());
    }
}
