//! Error types used throughout the submission pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the declarations workspace
///
/// Downstream failures never surface here: they are folded into the outcome
/// taxonomy by the submission client. What remains are configuration
/// problems and caller-side precondition violations.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DeclarationsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),
}

/// Caller-side data integrity errors detected before any network attempt.
///
/// These are distinct from the outcome taxonomy: a declaration that violates
/// them never reaches the circuit breaker.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreconditionViolation {
    #[error("amendment requested but declaration {correlation_id} has no amendment correlation id")]
    MissingAmendmentCorrelationId { correlation_id: String },

    #[error("amendment requested but declaration {correlation_id} has no amendment payload")]
    MissingAmendmentPayload { correlation_id: String },

    /// A value cannot be carried in an HTTP header (control characters,
    /// non-ASCII text).
    #[error("declaration {correlation_id} produces an invalid {header} header value")]
    InvalidHeaderValue { header: String, correlation_id: String },
}

/// Result type alias for declarations operations
pub type Result<T> = std::result::Result<T, DeclarationsError>;
