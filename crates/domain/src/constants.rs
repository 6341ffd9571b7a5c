//! Protocol constants
//!
//! Header names and literals required by the downstream declaration
//! services. Their test doubles match on these values exactly.

pub const HEADER_ACCEPT: &str = "Accept";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_DATE: &str = "Date";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CORRELATION_ID: &str = "X-Correlation-ID";
pub const HEADER_FORWARDED_HOST: &str = "X-Forwarded-Host";

pub const MIME_JSON: &str = "application/json";

/// Identifies the calling platform to the downstream gateway.
pub const FORWARDED_HOST_MARKER: &str = "MDTP";

// Default versioned submission paths
pub const DEFAULT_LEGACY_PATH: &str = "/declarations/passengerdeclaration/v1";
pub const DEFAULT_MODERNIZED_PATH: &str = "/passengerdeclaration/v1";

// Circuit breaker defaults
pub const DEFAULT_BREAKER_MAX_FAILURES: u64 = 5;
pub const DEFAULT_BREAKER_RESET_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
