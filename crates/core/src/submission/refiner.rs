//! Canonical payload preparation
//!
//! Schema failures are recovered here: they are logged with the
//! declaration's charge reference and correlation id and reported as
//! [`CanonicalPayload::Empty`], which the client turns into a
//! `ParsingException` without touching the network.

use declarations_domain::{Declaration, PreconditionViolation, SchemaViolation, SubmissionPayload};
use tracing::{debug, warn};

/// Output of the refiner.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalPayload {
    Refined(Box<SubmissionPayload>),
    /// The selected body failed canonical validation.
    Empty,
}

impl CanonicalPayload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn payload(&self) -> Option<&SubmissionPayload> {
        match self {
            Self::Refined(payload) => Some(payload),
            Self::Empty => None,
        }
    }

    /// Canonical JSON text, or `None` for the empty marker.
    pub fn to_canonical_json(&self) -> Option<Result<String, SchemaViolation>> {
        self.payload().map(SubmissionPayload::to_canonical_json)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadRefiner;

impl PayloadRefiner {
    /// Validate the body selected by `is_amendment` and return it in
    /// canonical form.
    ///
    /// Only a missing amendment body is an error; schema failures yield
    /// [`CanonicalPayload::Empty`].
    pub fn refine(
        &self,
        declaration: &Declaration,
        is_amendment: bool,
    ) -> Result<CanonicalPayload, PreconditionViolation> {
        let body = declaration.body_for(is_amendment)?;

        match SubmissionPayload::from_value(body) {
            Ok(payload) => {
                debug!(
                    charge_reference = %declaration.charge_reference,
                    is_amendment,
                    "Refined declaration payload"
                );
                Ok(CanonicalPayload::Refined(Box::new(payload)))
            }
            Err(violation) => {
                warn!(
                    charge_reference = %declaration.charge_reference,
                    correlation_id = %declaration.correlation_id,
                    is_amendment,
                    error = %violation,
                    "Declaration payload failed schema validation"
                );
                Ok(CanonicalPayload::Empty)
            }
        }
    }
}
