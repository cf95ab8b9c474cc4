//! Chatlink - settings core for a Minecraft-Discord chat bridge
//!
//! Resolves channel aliases, compiles message templates and derives bot
//! presence from operator configuration, and hot-reloads all of it without
//! readers ever seeing a mix of old and new settings.

pub mod bridge;
pub mod common;
pub mod config;
pub mod discord;
pub mod game;
pub mod settings;

pub use common::{ConfigError, PlaceholderExpander, PlayerContext, SettingsError};
pub use config::{ConfigSource, ConfigStore, EnvOverlay, InMemorySource, YamlFileSource};
pub use game::{MarkupPolicy, MessageKind, Template, TemplateCompiler};
pub use settings::{SettingsFacade, SettingsSnapshot};
