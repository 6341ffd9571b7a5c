//! # Declarations Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP transport
//! - Configuration loading from environment variables and files
//! - The declaration submission client
//!
//! ## Architecture
//! - Implements traits defined in `declarations-core`
//! - Contains all "impure" code (network I/O, environment, files)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::declarations::{DeclarationClient, SubmissionFailure};
