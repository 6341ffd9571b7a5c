//! Domain types and models

pub mod declaration;
pub mod outcome;
pub mod wire;

pub use declaration::Declaration;
pub use outcome::{
    DeclarationResponse, EndpointKind, LegacyDeclarationResponse, ModernizedDeclarationResponse,
    ResponseTaxonomy, SubmissionOutcome,
};
pub use wire::{MessageType, SchemaViolation, SubmissionPayload};
