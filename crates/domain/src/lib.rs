//! # Declarations Domain
//!
//! Business domain types for passenger declaration submission.
//!
//! This crate contains:
//! - The `Declaration` record and the outcome taxonomies
//! - The canonical wire schema both downstream integrations accept
//! - Domain error types and Result definitions
//! - Configuration structures and protocol constants
//!
//! ## Architecture
//! - No dependencies on other declarations crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod macros;

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
