//! Failures of a single downstream submission attempt
//!
//! Every variant counts as a failure for the circuit breaker and resolves to
//! the `Error` outcome.

use declarations_domain::DeclarationsError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmissionFailure {
    /// The downstream answered with something other than `204 No Content`.
    #[error("downstream responded with unexpected status {status}")]
    UnexpectedStatus { status: StatusCode },

    /// No usable response: connect failure or timeout.
    #[error("transport failure: {0}")]
    Transport(#[from] DeclarationsError),
}

impl SubmissionFailure {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedStatus { status } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_reports_code() {
        let failure = SubmissionFailure::UnexpectedStatus { status: StatusCode::OK };
        assert_eq!(failure.status(), Some(StatusCode::OK));
        assert_eq!(failure.to_string(), "downstream responded with unexpected status 200 OK");
    }

    #[test]
    fn transport_failure_wraps_domain_error() {
        let failure: SubmissionFailure =
            DeclarationsError::Network("HTTP request timed out".into()).into();
        assert_eq!(failure.status(), None);
        assert!(failure.to_string().contains("timed out"));
    }
}
