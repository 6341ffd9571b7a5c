//! Submission port interfaces

use async_trait::async_trait;
use declarations_domain::{Declaration, DeclarationResponse, Result};

/// Sends a declaration (or its amendment) downstream.
///
/// Every call resolves to exactly one [`DeclarationResponse`] unless the
/// declaration violates a precondition, which is returned as
/// `DeclarationsError::Precondition` before any network or breaker activity.
#[async_trait]
pub trait DeclarationSubmitter: Send + Sync {
    async fn submit(
        &self,
        declaration: &Declaration,
        is_amendment: bool,
    ) -> Result<DeclarationResponse>;
}
