//! Configuration loader
//!
//! Loads the submission configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If a required variable is missing, falls back to loading from file.
//!    A variable that is set but invalid is an error, never a fallback
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is checked with
//! [`SubmissionConfig::validate`] before it is returned.
//!
//! ## Environment Variables
//! - `DECLARATIONS_LEGACY_BASE_URL`: Legacy integration base URL
//! - `DECLARATIONS_LEGACY_PATH`: Legacy versioned path (optional)
//! - `DECLARATIONS_LEGACY_BEARER_TOKEN`: Legacy bearer credential
//! - `DECLARATIONS_MODERNIZED_BASE_URL`: Modernized integration base URL
//! - `DECLARATIONS_MODERNIZED_PATH`: Modernized versioned path (optional)
//! - `DECLARATIONS_MODERNIZED_BEARER_TOKEN`: Modernized bearer credential
//! - `DECLARATIONS_MODERNIZED_ENABLED`: Route to the modernized integration
//!   (true/false, default false)
//! - `DECLARATIONS_BREAKER_MAX_FAILURES`: Failures before the breaker opens
//!   (optional, default 5)
//! - `DECLARATIONS_BREAKER_RESET_TIMEOUT_SECS`: Breaker cool-down in seconds
//!   (optional, default 60)
//! - `DECLARATIONS_REQUEST_TIMEOUT_SECS`: Per-request timeout in seconds
//!   (optional, default 30)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./declarations.json` or `./declarations.toml` (current working
//!    directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use declarations_domain::constants::{
    DEFAULT_BREAKER_MAX_FAILURES, DEFAULT_BREAKER_RESET_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use declarations_domain::{
    BreakerSettings, DeclarationsError, EndpointConfig, Result, SubmissionConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["declarations.json", "declarations.toml", "config.json", "config.toml"];

const REQUIRED_ENV_VARS: [&str; 4] = [
    "DECLARATIONS_LEGACY_BASE_URL",
    "DECLARATIONS_LEGACY_BEARER_TOKEN",
    "DECLARATIONS_MODERNIZED_BASE_URL",
    "DECLARATIONS_MODERNIZED_BEARER_TOKEN",
];

/// Load configuration with automatic fallback strategy
///
/// Uses environment variables when every required one is set. If any
/// required variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `DeclarationsError::Config` if:
/// - An environment variable is set but invalid
/// - No config file is found when the environment is incomplete
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load() -> Result<SubmissionConfig> {
    if let Some(missing) = missing_required_env() {
        tracing::debug!(variable = missing, "Environment incomplete, trying config file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!(
        modernized_enabled = config.modernized_enabled,
        "Configuration loaded from environment variables"
    );
    Ok(config)
}

/// First required variable that is not set, if any.
fn missing_required_env() -> Option<&'static str> {
    REQUIRED_ENV_VARS.into_iter().find(|key| std::env::var(key).is_err())
}

/// Load configuration from environment variables
///
/// Base URLs and bearer tokens for both integrations are required; every
/// other setting falls back to its default.
///
/// # Errors
/// Returns `DeclarationsError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<SubmissionConfig> {
    let legacy = EndpointConfig {
        base_url: env_var("DECLARATIONS_LEGACY_BASE_URL")?,
        path: std::env::var("DECLARATIONS_LEGACY_PATH").ok(),
        bearer_token: env_var("DECLARATIONS_LEGACY_BEARER_TOKEN")?,
    };
    let modernized = EndpointConfig {
        base_url: env_var("DECLARATIONS_MODERNIZED_BASE_URL")?,
        path: std::env::var("DECLARATIONS_MODERNIZED_PATH").ok(),
        bearer_token: env_var("DECLARATIONS_MODERNIZED_BEARER_TOKEN")?,
    };

    let config = SubmissionConfig {
        legacy,
        modernized,
        modernized_enabled: env_bool("DECLARATIONS_MODERNIZED_ENABLED", false),
        circuit_breaker: BreakerSettings {
            max_failures: env_parse(
                "DECLARATIONS_BREAKER_MAX_FAILURES",
                DEFAULT_BREAKER_MAX_FAILURES,
            )?,
            reset_timeout_secs: env_parse(
                "DECLARATIONS_BREAKER_RESET_TIMEOUT_SECS",
                DEFAULT_BREAKER_RESET_TIMEOUT_SECS,
            )?,
        },
        request_timeout_secs: env_parse(
            "DECLARATIONS_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?,
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `DeclarationsError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<SubmissionConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DeclarationsError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DeclarationsError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DeclarationsError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<SubmissionConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DeclarationsError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DeclarationsError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(DeclarationsError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent and grandparent, then
/// the same three levels relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| [root.clone(), root.join(".."), root.join("../..")])
        .flat_map(|dir| CONFIG_FILE_NAMES.map(|name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `DeclarationsError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        DeclarationsError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional numeric environment variable, using `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| DeclarationsError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
