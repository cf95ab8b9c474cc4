//! Channel alias directory.
//!
//! Maps operator-chosen aliases under `channels.*` to platform channel ids
//! and back. Built in one pass from a single binding set and never edited
//! afterwards; a reload builds a new directory.

use std::collections::HashMap;
use std::num::NonZeroU64;

use serde_json::{Map, Value};
use serenity::model::id::ChannelId;
use tracing::debug;

/// Channel id meaning "no channel configured".
pub const NO_CHANNEL: u64 = 0;

/// How a channel key was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLookup {
    /// The key was itself a numeric id; the alias map was not consulted.
    Literal(u64),
    /// The key is an alias bound to this id.
    Bound(u64),
    /// The key is neither numeric nor a known alias.
    Unbound,
}

impl ChannelLookup {
    /// Collapse to the public contract: unbound becomes [`NO_CHANNEL`].
    pub fn id(self) -> u64 {
        match self {
            Self::Literal(id) | Self::Bound(id) => id,
            Self::Unbound => NO_CHANNEL,
        }
    }
}

/// Bidirectional alias <-> id mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelDirectory {
    by_alias: HashMap<String, u64>,
    by_id: HashMap<u64, Vec<String>>,
}

impl ChannelDirectory {
    /// Build both indices from the raw `channels` section.
    ///
    /// Only entries whose value is an integer count as bindings; anything
    /// else is skipped. Aliases for one id keep their declaration order.
    pub fn rebuild(raw_entries: &Map<String, Value>) -> Self {
        let mut directory = Self::default();

        for (alias, raw) in raw_entries {
            let Some(id) = raw.as_u64() else {
                debug!("Skipping non-integer channel entry '{}': {}", alias, raw);
                continue;
            };
            directory.by_alias.insert(alias.clone(), id);
            directory.by_id.entry(id).or_default().push(alias.clone());
        }

        directory
    }

    /// Resolve a key with the resolution path made explicit.
    pub fn lookup(&self, key: &str) -> ChannelLookup {
        if let Ok(id) = key.parse::<u64>() {
            return ChannelLookup::Literal(id);
        }
        match self.by_alias.get(key) {
            Some(&id) => ChannelLookup::Bound(id),
            None => ChannelLookup::Unbound,
        }
    }

    /// Resolve a key to a channel id, or [`NO_CHANNEL`] if it is unknown.
    ///
    /// Numeric keys are returned as-is so config can name a channel either
    /// by alias or by raw id.
    pub fn resolve(&self, key: &str) -> u64 {
        self.lookup(key).id()
    }

    /// Resolve a key to a serenity channel id, `None` for no channel.
    pub fn channel_id(&self, key: &str) -> Option<ChannelId> {
        NonZeroU64::new(self.resolve(key)).map(ChannelId::from)
    }

    /// All aliases bound to `id`, in declaration order.
    ///
    /// `None` when no alias maps to the id, as opposed to an empty list.
    pub fn reverse_lookup(&self, id: u64) -> Option<&[String]> {
        self.by_id.get(&id).map(Vec::as_slice)
    }

    /// Number of alias bindings.
    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_rebuild_skips_non_integer_values() {
        let directory = ChannelDirectory::rebuild(&entries(json!({
            "general": 123,
            "ops": 456,
            "note": "not-a-number"
        })));

        assert_eq!(directory.resolve("general"), 123);
        assert_eq!(directory.resolve("ops"), 456);
        assert_eq!(directory.resolve("note"), NO_CHANNEL);
        assert_eq!(directory.lookup("note"), ChannelLookup::Unbound);
        assert_eq!(directory.reverse_lookup(123), Some(&["general".to_string()][..]));
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_numeric_key_bypasses_aliases() {
        let directory = ChannelDirectory::rebuild(&entries(json!({ "789": 1 })));
        assert_eq!(directory.resolve("789"), 789);
        assert_eq!(directory.lookup("789"), ChannelLookup::Literal(789));

        let empty = ChannelDirectory::default();
        assert_eq!(empty.resolve("789"), 789);
    }

    #[test]
    fn test_explicit_zero_differs_from_unbound() {
        let directory = ChannelDirectory::rebuild(&entries(json!({ "disabled": 0 })));
        assert_eq!(directory.lookup("disabled"), ChannelLookup::Bound(0));
        assert_eq!(directory.lookup("missing"), ChannelLookup::Unbound);
        assert_eq!(directory.resolve("disabled"), directory.resolve("missing"));
        assert!(directory.channel_id("disabled").is_none());
    }

    #[test]
    fn test_reverse_lookup_keeps_declaration_order() {
        let directory = ChannelDirectory::rebuild(&entries(json!({
            "staff": 10,
            "general": 20,
            "admins": 10,
            "mods": 10
        })));

        let aliases = directory.reverse_lookup(10).unwrap();
        assert_eq!(aliases, ["staff", "admins", "mods"]);
        assert!(directory.reverse_lookup(30).is_none());
    }

    #[test]
    fn test_negative_and_fractional_values_skipped() {
        let directory = ChannelDirectory::rebuild(&entries(json!({
            "neg": -1,
            "frac": 1.5,
            "list": [1, 2],
            "ok": 5
        })));
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.resolve("neg"), NO_CHANNEL);
        assert_eq!(directory.resolve("frac"), NO_CHANNEL);
    }

    #[test]
    fn test_channel_id_conversion() {
        let directory = ChannelDirectory::rebuild(&entries(json!({ "general": 123 })));
        assert_eq!(directory.channel_id("general").map(|c| c.get()), Some(123));
        assert!(directory.channel_id("unknown").is_none());
    }
}
