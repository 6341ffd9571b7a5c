//! Conversions from external infrastructure errors into domain errors.

use declarations_domain::DeclarationsError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DeclarationsError);

impl From<InfraError> for DeclarationsError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DeclarationsError> for InfraError {
    fn from(value: DeclarationsError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDeclarationsError {
    fn into_declarations(self) -> DeclarationsError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DeclarationsError */
/* -------------------------------------------------------------------------- */

impl IntoDeclarationsError for HttpError {
    fn into_declarations(self) -> DeclarationsError {
        if self.is_timeout() {
            return DeclarationsError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return DeclarationsError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return DeclarationsError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        DeclarationsError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_declarations())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
