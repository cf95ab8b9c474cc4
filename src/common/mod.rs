//! Common types shared across the application.

pub mod error;
pub mod types;

pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use types::{PlaceholderExpander, PlayerContext};
