//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Platform name does not belong to a supported family
    #[error("[E004] Unknown database platform '{platform}': expected a postgres-like or mysql-like platform")]
    UnknownPlatform { platform: String },

    /// E005: Version string is not a dotted numeric version
    #[error("[E005] Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// E006: Short name is empty
    #[error("[E006] Migration short name must not be empty")]
    EmptyShortName,

    /// E007: IO error with file path context
    #[error("[E007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
