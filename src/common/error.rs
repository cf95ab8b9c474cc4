//! Error types for the settings layer.
//!
//! Only whole-source failures are errors. Missing or malformed individual
//! values resolve to documented defaults and never show up here.

use thiserror::Error;

/// Configuration source errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config from {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Config source unavailable: {message}")]
    Unavailable { message: String },
}

/// Errors surfaced by the settings facade.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Reload failed, previous settings kept: {0}")]
    Reload(#[source] ConfigError),

    #[error("Initial settings load failed: {0}")]
    InitialLoad(#[source] ConfigError),
}

/// Result type alias for configuration source operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for facade operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;
