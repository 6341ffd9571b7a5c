//! Declaration records handed to the submission client

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PreconditionViolation;

/// A passenger declaration as persisted by the intake service.
///
/// Owned by the caller and never mutated by the submission pipeline. The
/// bodies are kept as raw JSON; only the refiner gives them a typed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub charge_reference: String,
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amend_correlation_id: Option<String>,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amend_data: Option<Value>,
}

impl Declaration {
    pub fn new(
        charge_reference: impl Into<String>,
        correlation_id: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            charge_reference: charge_reference.into(),
            correlation_id: correlation_id.into(),
            amend_correlation_id: None,
            data,
            amend_data: None,
        }
    }

    /// Attach an amendment (correlation id and body) to this declaration.
    #[must_use]
    pub fn with_amendment(
        mut self,
        amend_correlation_id: impl Into<String>,
        amend_data: Value,
    ) -> Self {
        self.amend_correlation_id = Some(amend_correlation_id.into());
        self.amend_data = Some(amend_data);
        self
    }

    /// Body to submit for this submission.
    pub fn body_for(&self, is_amendment: bool) -> Result<&Value, PreconditionViolation> {
        if !is_amendment {
            return Ok(&self.data);
        }

        self.amend_data.as_ref().ok_or_else(|| PreconditionViolation::MissingAmendmentPayload {
            correlation_id: self.correlation_id.clone(),
        })
    }
}
