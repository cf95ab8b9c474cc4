//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `CHATLINK_DISCORD_TOKEN` - bot token (`token`)
//! - `CHATLINK_GUILD_ID` - guild id (`guild`)
//! - `CHATLINK_CONFIG` - path of the config file

use std::env;

use serde_json::{Map, Value};
use tracing::debug;

use crate::common::error::ConfigResult;
use crate::config::source::ConfigSource;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "CHATLINK";

/// Wraps a source and overlays environment variables on every load.
///
/// Lets the token live outside the config file while still taking part in
/// reloads.
#[derive(Debug)]
pub struct EnvOverlay<S> {
    inner: S,
}

impl<S: ConfigSource> EnvOverlay<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: ConfigSource> ConfigSource for EnvOverlay<S> {
    fn describe(&self) -> String {
        format!("{} (+env)", self.inner.describe())
    }

    fn load(&self) -> ConfigResult<Value> {
        let mut value = self.inner.load()?;
        apply_overrides(&mut value, |name| env::var(name).ok());
        Ok(value)
    }
}

/// Apply overrides found through `lookup` to a loaded tree.
pub fn apply_overrides(value: &mut Value, lookup: impl Fn(&str) -> Option<String>) {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let Some(root) = value.as_object_mut() else {
        return;
    };

    if let Some(token) = lookup(&format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        if !token.is_empty() {
            debug!("Using bot token from environment");
            root.insert("token".to_string(), Value::String(token));
        }
    }

    if let Some(guild) = lookup(&format!("{}_GUILD_ID", ENV_PREFIX)) {
        match guild.trim().parse::<u64>() {
            Ok(id) => {
                root.insert("guild".to_string(), Value::from(id));
            }
            Err(_) => debug!("Ignoring non-numeric {}_GUILD_ID", ENV_PREFIX),
        }
    }
}

/// Get the config file path from environment or use default.
///
/// Checks `CHATLINK_CONFIG`, otherwise returns "config.yml".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "config.yml".to_string())
}
