//! Error types that escape the diagnostics log
//!
//! User mistakes in an option set are never returned as `Err`; they are
//! recorded in the [`Log`](crate::logging::Log). The types here cover the two
//! things that can't be expressed as a diagnostic: a caller handing an enum
//! value to a translator that has no counterpart for it, and failing to load
//! an option file.

use thiserror::Error;

/// An enum value reached a translator that has no mapping for it.
///
/// Only reachable when a caller bypasses the orchestrators, which handle the
/// unmapped values (such as `LogLevel::Silent`) before translating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Result type for enum translation
pub type ContractResult<T> = Result<T, ContractViolation>;

/// Errors that can occur while loading an option set from disk or strings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown {kind}: \"{value}\"")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Expected KEY=VALUE, got \"{0}\"")]
    MissingEquals(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
