//! Raw configuration sources.
//!
//! A source produces an already-parsed key/value tree. Map order is kept as
//! declared, which the channel directory relies on for reverse lookups.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::common::error::{ConfigError, ConfigResult};

/// Something that can produce the raw configuration tree on demand.
pub trait ConfigSource: Send + Sync {
    /// Human-readable origin, used in logs and errors.
    fn describe(&self) -> String;

    /// Load a fresh tree. Called on startup and on every reload.
    fn load(&self) -> ConfigResult<Value>;
}

/// Parse YAML text into a configuration tree.
///
/// An empty document is an empty tree. A document whose top level is not a
/// mapping is rejected.
pub fn parse_yaml(content: &str, origin: &str) -> ConfigResult<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(value),
        _ => Err(ConfigError::Parse {
            origin: origin.to_string(),
            message: "top level must be a mapping".to_string(),
        }),
    }
}

/// YAML configuration file on disk.
#[derive(Debug, Clone)]
pub struct YamlFileSource {
    path: PathBuf,
}

impl YamlFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for YamlFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> ConfigResult<Value> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io {
            path: self.describe(),
            source: e,
        })?;
        parse_yaml(&content, &self.describe())
    }
}

/// YAML text held in memory.
///
/// The text can be swapped between reloads, and the source can be marked
/// unavailable to make the next load fail.
#[derive(Debug, Default)]
pub struct InMemorySource {
    content: RwLock<Option<String>>,
}

impl InMemorySource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: RwLock::new(Some(content.into())),
        }
    }

    /// Replace the text served by the next load.
    pub fn set(&self, content: impl Into<String>) {
        *self.content.write() = Some(content.into());
    }

    /// Make subsequent loads fail until `set` is called again.
    pub fn set_unavailable(&self) {
        *self.content.write() = None;
    }
}

impl ConfigSource for InMemorySource {
    fn describe(&self) -> String {
        "<memory>".to_string()
    }

    fn load(&self) -> ConfigResult<Value> {
        match self.content.read().as_deref() {
            Some(content) => parse_yaml(content, &self.describe()),
            None => Err(ConfigError::Unavailable {
                message: "in-memory source has no content".to_string(),
            }),
        }
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for std::sync::Arc<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn load(&self) -> ConfigResult<Value> {
        (**self).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_keeps_declaration_order() {
        let value = parse_yaml("channels:\n  zeta: 1\n  alpha: 2\n  mid: 3\n", "test").unwrap();
        let keys: Vec<&str> = value["channels"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_document_is_empty_tree() {
        let value = parse_yaml("", "test").unwrap();
        assert_eq!(value, Value::Object(Map::new()));

        let value = parse_yaml("# only a comment\n", "test").unwrap();
        assert_eq!(value, Value::Object(Map::new()));
    }

    #[test]
    fn test_non_mapping_root_rejected() {
        let err = parse_yaml("- a\n- b\n", "test").unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn test_broken_yaml_is_parse_error() {
        let err = parse_yaml("token: [unclosed\n", "broken.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.yml"));
    }

    #[test]
    fn test_file_source_reads_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token: abc").unwrap();
        writeln!(file, "guild: 42").unwrap();

        let source = YamlFileSource::new(file.path());
        let value = source.load().unwrap();
        assert_eq!(value["token"], "abc");
        assert_eq!(value["guild"], 42);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = YamlFileSource::new(dir.path().join("absent.yml"));
        assert!(matches!(source.load(), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_in_memory_source_swaps_and_fails() {
        let source = InMemorySource::new("guild: 1");
        assert_eq!(source.load().unwrap()["guild"], 1);

        source.set("guild: 2");
        assert_eq!(source.load().unwrap()["guild"], 2);

        source.set_unavailable();
        assert!(matches!(source.load(), Err(ConfigError::Unavailable { .. })));
    }
}
