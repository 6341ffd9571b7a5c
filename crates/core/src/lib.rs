//! # Declarations Core
//!
//! Pure submission logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Endpoint routing between the legacy and modernized integrations
//! - Protocol header construction
//! - Canonical payload refinement
//! - The `DeclarationSubmitter` port implemented by the infra layer
//!
//! ## Architecture Principles
//! - Depends only on `declarations-common` and `declarations-domain`
//! - No HTTP or platform code
//! - External effects via traits

pub mod submission;

pub use submission::{
    CanonicalPayload, DeclarationSubmitter, EndpointRouter, HeaderBuilder, PayloadRefiner, Route,
    RoutingTarget, SubmissionContext, SubmissionHeaders,
};
