//! Configuration sources and typed lookups.

pub mod env;
pub mod source;
pub mod store;

pub use env::{get_config_path, EnvOverlay};
pub use source::{parse_yaml, ConfigSource, InMemorySource, YamlFileSource};
pub use store::ConfigStore;
