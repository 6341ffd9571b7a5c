//! Submission outcome taxonomies
//!
//! The legacy and modernized integrations are versioned independently, so
//! each declares its own closed response enumeration. The submission client
//! classifies every call into a [`SubmissionOutcome`] and adapts it to the
//! taxonomy of the endpoint that was used via [`ResponseTaxonomy`].

use serde::{Deserialize, Serialize};

/// Downstream integration a submission was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Legacy,
    Modernized,
}

crate::impl_label_conversions!(EndpointKind {
    Legacy => "legacy",
    Modernized => "modernized",
});

impl EndpointKind {
    pub fn taxonomy(self) -> ResponseTaxonomy {
        match self {
            Self::Legacy => ResponseTaxonomy::Legacy,
            Self::Modernized => ResponseTaxonomy::Modernized,
        }
    }
}

/// Endpoint-independent classification of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionOutcome {
    /// Downstream accepted the declaration.
    Submitted,
    /// Downstream rejected it, the transport failed, or the breaker is open.
    Error,
    /// The payload failed canonical validation; nothing was sent.
    ParsingException,
}

crate::impl_label_conversions!(SubmissionOutcome {
    Submitted => "submitted",
    Error => "error",
    ParsingException => "parsing_exception",
});

/// Response taxonomy of the legacy integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegacyDeclarationResponse {
    Submitted,
    Error,
    ParsingException,
}

/// Response taxonomy of the modernized integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModernizedDeclarationResponse {
    Submitted,
    Error,
    ParsingException,
}

/// What callers receive: the outcome tagged with the integration used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationResponse {
    Legacy(LegacyDeclarationResponse),
    Modernized(ModernizedDeclarationResponse),
}

impl DeclarationResponse {
    /// Collapse back to the endpoint-independent outcome.
    pub fn outcome(self) -> SubmissionOutcome {
        match self {
            Self::Legacy(LegacyDeclarationResponse::Submitted)
            | Self::Modernized(ModernizedDeclarationResponse::Submitted) => {
                SubmissionOutcome::Submitted
            }
            Self::Legacy(LegacyDeclarationResponse::Error)
            | Self::Modernized(ModernizedDeclarationResponse::Error) => SubmissionOutcome::Error,
            Self::Legacy(LegacyDeclarationResponse::ParsingException)
            | Self::Modernized(ModernizedDeclarationResponse::ParsingException) => {
                SubmissionOutcome::ParsingException
            }
        }
    }

    pub fn endpoint(self) -> EndpointKind {
        match self {
            Self::Legacy(_) => EndpointKind::Legacy,
            Self::Modernized(_) => EndpointKind::Modernized,
        }
    }
}

/// Selects which response enumeration an outcome is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseTaxonomy {
    Legacy,
    Modernized,
}

impl ResponseTaxonomy {
    pub fn adapt(self, outcome: SubmissionOutcome) -> DeclarationResponse {
        match self {
            Self::Legacy => DeclarationResponse::Legacy(match outcome {
                SubmissionOutcome::Submitted => LegacyDeclarationResponse::Submitted,
                SubmissionOutcome::Error => LegacyDeclarationResponse::Error,
                SubmissionOutcome::ParsingException => LegacyDeclarationResponse::ParsingException,
            }),
            Self::Modernized => DeclarationResponse::Modernized(match outcome {
                SubmissionOutcome::Submitted => ModernizedDeclarationResponse::Submitted,
                SubmissionOutcome::Error => ModernizedDeclarationResponse::Error,
                SubmissionOutcome::ParsingException => {
                    ModernizedDeclarationResponse::ParsingException
                }
            }),
        }
    }
}
