//! Error types for execgate.
//!
//! Uses thiserror for derive macros. These errors cover everything that is
//! resolved *before* a process exists: malformed requests, sandbox
//! rejections, and configuration problems. Failures after a stream has been
//! opened are never errors; they travel as the terminal
//! [`ExecutionResult`](crate::exec::ExecutionResult) instead.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The requested working directory is not inside any allowed root.
    #[error("sandbox violation: '{}' {reason}", path.display())]
    SandboxViolation {
        /// The path exactly as requested (before canonicalization).
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// The request is malformed (empty command, NUL bytes, bad env names).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// The gateway itself failed while handling an otherwise valid request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Create a sandbox violation for `path`.
    pub fn sandbox_violation(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        GatewayError::SandboxViolation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GatewayError::SandboxViolation { .. } => exit_codes::SANDBOX_VIOLATION,
            GatewayError::InvalidRequest(_) => exit_codes::USER_ERROR,
            GatewayError::Config(_) => exit_codes::USER_ERROR,
            GatewayError::UserError(_) => exit_codes::USER_ERROR,
            GatewayError::Internal(_) => exit_codes::RUNTIME_FAILURE,
        }
    }

    /// Whether this error is a sandbox rejection (as opposed to a malformed request).
    pub fn is_sandbox_violation(&self) -> bool {
        matches!(self, GatewayError::SandboxViolation { .. })
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
