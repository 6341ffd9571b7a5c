//! Time utilities
//!
//! - **[`http_date`]**: RFC 1123 HTTP-date formatting and validation
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "foundation")]
//! # {
//! use chrono::{TimeZone, Utc};
//! use declarations_common::time::{format_http_date, is_http_date};
//!
//! let instant = Utc.with_ymd_and_hms(2024, 10, 23, 7, 28, 0).unwrap();
//! let header = format_http_date(instant);
//! assert_eq!(header, "Wed, 23 Oct 2024 07:28:00 GMT");
//! assert!(is_http_date(&header));
//! # }
//! ```

pub mod http_date;

pub use http_date::{format_http_date, is_http_date, HTTP_DATE_FORMAT};
