//! Error types for the Toolgate domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Note that the permission
//! gateway itself never surfaces these to the agent runtime: every failure on
//! the decision path collapses into a deny.

use thiserror::Error;

/// The top-level error type for all Toolgate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request decoding ---
    #[error("Invalid tool request: {0}")]
    InvalidRequest(String),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the operator console transport.
#[derive(Debug, Clone, Error)]
pub enum ConsoleError {
    #[error("Failed to read operator input: {0}")]
    ReadFailed(String),

    #[error("Failed to write to operator console: {0}")]
    WriteFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_error_displays_correctly() {
        let err = ConsoleError::ReadFailed("stdin closed".into());
        assert_eq!(err.to_string(), "Failed to read operator input: stdin closed");
    }

    #[test]
    fn invalid_request_displays_correctly() {
        let err = Error::InvalidRequest("missing 'name'".into());
        assert_eq!(err.to_string(), "Invalid tool request: missing 'name'");
    }

    #[test]
    fn serde_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
