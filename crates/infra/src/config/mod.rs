//! Configuration loading
//!
//! Submission settings come from environment variables or a JSON/TOML file
//! and are validated once at startup.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
