//! Common types and errors for the Reader MCP server
//!
//! This crate provides the error type and logging plumbing shared by every
//! other crate in the workspace.

pub mod sanitizer;
pub mod telemetry;

use thiserror::Error;

/// Core error types for Reader operations
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("{var} environment variable is not set")]
    MissingToken { var: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Reader API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response from Reader API: {0}")]
    InvalidResponse(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 101;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_message_names_variable() {
        let err = ReaderError::MissingToken {
            var: "ACCESS_TOKEN".to_string(),
        };
        assert_eq!(err.to_string(), "ACCESS_TOKEN environment variable is not set");
    }

    #[test]
    fn test_upstream_message_keeps_status_and_body() {
        let err = ReaderError::Upstream {
            status: 429,
            body: "Request was throttled.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Reader API returned HTTP 429: Request was throttled."
        );
    }
}
