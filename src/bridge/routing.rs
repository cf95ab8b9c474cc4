//! Message-type routing.
//!
//! `message-types.<type>` names the channel key (alias or raw id) that a
//! kind of relayed message goes to. `none` disables the type.

use std::collections::HashMap;

use serde_json::{Map, Value};
use serenity::model::id::ChannelId;

use crate::bridge::channels::ChannelDirectory;

/// Routing key meaning "do not relay this type".
pub const ROUTE_NONE: &str = "none";

/// Message types the bridge relays.
pub mod types {
    pub const CHAT: &str = "chat";
    pub const JOIN: &str = "join";
    pub const LEAVE: &str = "leave";
    pub const DEATH: &str = "death";
    pub const KICK: &str = "kick";
    pub const MUTE: &str = "mute";
}

/// Routing keys per message type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRoutes {
    keys: HashMap<String, String>,
}

impl MessageRoutes {
    /// Build from the raw `message-types` section. Integer values are taken
    /// as raw channel ids; other non-string values are ignored.
    pub fn from_section(section: Option<&Map<String, Value>>) -> Self {
        let keys = section
            .into_iter()
            .flatten()
            .filter_map(|(kind, raw)| {
                let key = match raw {
                    Value::String(s) => s.clone(),
                    Value::Number(n) if n.is_u64() => n.to_string(),
                    _ => return None,
                };
                Some((kind.clone(), key))
            })
            .collect();
        Self { keys }
    }

    /// The channel key configured for a message type, `"none"` if unset.
    pub fn channel_key(&self, message_type: &str) -> &str {
        self.keys
            .get(message_type)
            .map(String::as_str)
            .unwrap_or(ROUTE_NONE)
    }

    /// Resolve a message type to its destination channel.
    ///
    /// `None` when the type is disabled or its key does not resolve.
    pub fn route(&self, message_type: &str, directory: &ChannelDirectory) -> Option<ChannelId> {
        match self.channel_key(message_type) {
            ROUTE_NONE => None,
            key => directory.channel_id(key),
        }
    }
}
