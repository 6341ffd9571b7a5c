//! Passenger declaration submission
//!
//! [`DeclarationClient`] sends declarations to the legacy or modernized
//! integration, selected by configuration, through one circuit breaker per
//! integration.
//!
//! # Usage
//!
//! ```no_run
//! use declarations_domain::{Declaration, SubmissionOutcome};
//! use declarations_infra::config;
//! use declarations_infra::integrations::declarations::DeclarationClient;
//!
//! # async fn example(declaration: Declaration) -> declarations_domain::Result<()> {
//! let client = DeclarationClient::new(&config::load()?)?;
//!
//! let response = client.submit(&declaration, false).await?;
//! if response.outcome() == SubmissionOutcome::ParsingException {
//!     // fix the stored declaration before resubmitting
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod errors;

pub use client::DeclarationClient;
pub use errors::SubmissionFailure;
