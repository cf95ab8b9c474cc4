//! Bot presence derived from configuration.
//!
//! An unknown status falls back to online. An unknown activity type falls
//! back to the default (playing) activity rather than turning activity off;
//! only an explicit `none` disables it.

use serenity::gateway::ActivityData;
use serenity::model::user::OnlineStatus;
use tracing::warn;

use crate::config::ConfigStore;

pub const DEFAULT_STATUS: &str = "online";
pub const DEFAULT_ACTIVITY: &str = "default";
pub const DEFAULT_ACTIVITY_MESSAGE: &str = "Minecraft";

/// Legacy activity token treated the same as `DEFAULT`.
const LEGACY_DEFAULT_ALIAS: &str = "CUSTOM_STATUS";

/// Online status of the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Online,
    Idle,
    DoNotDisturb,
    Invisible,
    Offline,
}

impl PresenceStatus {
    /// Parse a status key (`online`, `idle`, `dnd`, `invisible`, `offline`),
    /// ignoring case and surrounding whitespace.
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "online" => Some(Self::Online),
            "idle" => Some(Self::Idle),
            "dnd" => Some(Self::DoNotDisturb),
            "invisible" => Some(Self::Invisible),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

impl From<PresenceStatus> for OnlineStatus {
    fn from(status: PresenceStatus) -> Self {
        match status {
            PresenceStatus::Online => OnlineStatus::Online,
            PresenceStatus::Idle => OnlineStatus::Idle,
            PresenceStatus::DoNotDisturb => OnlineStatus::DoNotDisturb,
            PresenceStatus::Invisible => OnlineStatus::Invisible,
            PresenceStatus::Offline => OnlineStatus::Offline,
        }
    }
}

/// Kind of activity shown under the bot's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Playing,
    Watching,
    Listening,
    Competing,
    Default,
}

/// How the configured activity type was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySelection {
    /// Explicitly disabled with `none`.
    Disabled,
    /// A recognised activity type.
    Known(ActivityKind),
    /// Unrecognised input, replaced by [`ActivityKind::Default`].
    Fallback,
}

impl ActivitySelection {
    pub fn kind(self) -> Option<ActivityKind> {
        match self {
            Self::Disabled => None,
            Self::Known(kind) => Some(kind),
            Self::Fallback => Some(ActivityKind::Default),
        }
    }
}

/// Resolved presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceConfig {
    pub status: PresenceStatus,
    /// `None` only when configuration asked for no activity.
    pub activity_type: Option<ActivityKind>,
    pub activity_message: String,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            status: PresenceStatus::Online,
            activity_type: Some(ActivityKind::Default),
            activity_message: DEFAULT_ACTIVITY_MESSAGE.to_string(),
        }
    }
}

impl PresenceConfig {
    /// Read `presence.*` from a store.
    pub fn from_store(store: &ConfigStore) -> Self {
        let status = resolve_status(&store.get_string("presence.status", DEFAULT_STATUS));
        let (activity_type, activity_message) = resolve_activity(
            &store.get_string("presence.activity", DEFAULT_ACTIVITY),
            &store.get_string("presence.message", DEFAULT_ACTIVITY_MESSAGE),
        );
        Self {
            status,
            activity_type,
            activity_message,
        }
    }

    pub fn online_status(&self) -> OnlineStatus {
        self.status.into()
    }

    /// Gateway activity, `None` when activity is disabled.
    pub fn activity_data(&self) -> Option<ActivityData> {
        let message = self.activity_message.clone();
        self.activity_type.map(|kind| match kind {
            ActivityKind::Playing | ActivityKind::Default => ActivityData::playing(message),
            ActivityKind::Watching => ActivityData::watching(message),
            ActivityKind::Listening => ActivityData::listening(message),
            ActivityKind::Competing => ActivityData::competing(message),
        })
    }
}

/// Map a status key to a status, falling back to online.
pub fn resolve_status(raw: &str) -> PresenceStatus {
    PresenceStatus::from_key(raw).unwrap_or_else(|| {
        warn!("Unknown presence status '{}', using online", raw);
        PresenceStatus::Online
    })
}

/// Classify an activity type token after trimming and uppercasing it.
pub fn select_activity(raw_type: &str) -> ActivitySelection {
    let normalized = raw_type.trim().to_uppercase();
    match normalized.as_str() {
        "NONE" => ActivitySelection::Disabled,
        "PLAYING" => ActivitySelection::Known(ActivityKind::Playing),
        "WATCHING" => ActivitySelection::Known(ActivityKind::Watching),
        "LISTENING" => ActivitySelection::Known(ActivityKind::Listening),
        "COMPETING" => ActivitySelection::Known(ActivityKind::Competing),
        "DEFAULT" | LEGACY_DEFAULT_ALIAS => ActivitySelection::Known(ActivityKind::Default),
        _ => ActivitySelection::Fallback,
    }
}

/// Resolve the activity type and message. The message passes through as-is.
pub fn resolve_activity(raw_type: &str, raw_message: &str) -> (Option<ActivityKind>, String) {
    let selection = select_activity(raw_type);
    if selection == ActivitySelection::Fallback {
        warn!("Unknown presence activity '{}', using default", raw_type);
    }
    (selection.kind(), raw_message.to_string())
}
