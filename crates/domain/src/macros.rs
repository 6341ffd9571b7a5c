//! Macro for implementing Display and FromStr for label enums
//!
//! Endpoint kinds and outcome values are logged and configured by stable
//! lowercase labels. This macro keeps both directions of that mapping in one
//! place.
//!
//! # Example
//!
//! ```rust
//! use declarations_domain::impl_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Primary,
//!     Fallback,
//! }
//!
//! impl_label_conversions!(Channel {
//!     Primary => "primary",
//!     Fallback => "fallback",
//! });
//! ```

/// Implements Display and FromStr traits for label enums
///
/// - Display writes the label verbatim
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
