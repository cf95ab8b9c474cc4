//! Typed lookups over a raw configuration tree.

use serde_json::{Map, Value};
use tracing::debug;

use crate::common::error::ConfigResult;
use crate::config::source::ConfigSource;

/// One loaded configuration tree with typed, defaulting accessors.
///
/// Immutable once built. A reload loads a new store and drops the old one
/// rather than editing it.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    root: Value,
}

impl ConfigStore {
    /// Load a fresh store from a source.
    pub fn load(source: &dyn ConfigSource) -> ConfigResult<Self> {
        let root = source.load()?;
        debug!("Loaded configuration tree from {}", source.describe());
        Ok(Self::from_value(root))
    }

    /// Wrap an already-parsed tree. `null` is treated as an empty tree.
    pub fn from_value(root: Value) -> Self {
        let root = match root {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Self { root }
    }

    /// Look up a dotted path such as `commands.execute.enabled`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.root, |node, key| node.as_object()?.get(key))
    }

    /// The mapping at `path`, if the value there is a mapping.
    pub fn section(&self, path: &str) -> Option<&Map<String, Value>> {
        self.get(path)?.as_object()
    }

    pub fn get_string(&self, path: &str, default: &str) -> String {
        self.get_text(path).unwrap_or_else(|| default.to_string())
    }

    /// The scalar at `path` as text, or `None` if absent or not a scalar.
    ///
    /// Integers and booleans are rendered as text, so an unquoted channel id
    /// reads the same as a quoted one.
    pub fn get_text(&self, path: &str) -> Option<String> {
        let value = self.get(path)?;
        let text = scalar_text(value);
        if text.is_none() {
            debug!("Ignoring non-scalar value at '{}': {}", path, value);
        }
        text
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        match self.get(path) {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                debug!("Ignoring non-boolean value at '{}': {}", path, other);
                default
            }
            None => default,
        }
    }

    pub fn get_u64(&self, path: &str, default: u64) -> u64 {
        match self.get(path) {
            Some(value) => value.as_u64().unwrap_or_else(|| {
                debug!("Ignoring non-integer value at '{}': {}", path, value);
                default
            }),
            None => default,
        }
    }

    pub fn get_i64(&self, path: &str, default: i64) -> i64 {
        match self.get(path) {
            Some(value) => value.as_i64().unwrap_or_else(|| {
                debug!("Ignoring non-integer value at '{}': {}", path, value);
                default
            }),
            None => default,
        }
    }

    /// A list of strings. Integer and boolean items are rendered as text so
    /// unquoted role ids still count; anything else is skipped.
    pub fn get_string_list(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
