//! Message kinds and their fixed template schemas.

use crate::config::ConfigStore;
use crate::game::formatter::{Template, TemplateCompiler};
use crate::game::markup::MarkupPolicy;

/// Every kind of templated message the bridge sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    DiscordToMc,
    McToDiscord,
    Join,
    Quit,
    Death,
    Kick,
    Unmute,
    TempMute,
    TempMuteReason,
    PermMute,
    PermMuteReason,
    Console,
}

/// Static description of one message kind.
#[derive(Debug)]
pub struct KindSpec {
    /// Config path of the raw template text.
    pub path: &'static str,
    pub default_text: &'static str,
    pub markup: MarkupPolicy,
    pub schema: &'static [&'static str],
    /// Raw text goes through the placeholder expander for each player
    /// before it is compiled, so these are never cached compiled.
    pub player_contextual: bool,
}

const PLAYER_EVENT: &[&str] = &["username", "displayname", "defaultmessage"];

static DISCORD_TO_MC: KindSpec = KindSpec {
    path: "messages.discord-to-mc",
    default_text: "[#{channel}] {fullname}: {message}",
    markup: MarkupPolicy::Retain,
    schema: &["channel", "username", "tag", "fullname", "nickname", "color", "message"],
    player_contextual: false,
};

static MC_TO_DISCORD: KindSpec = KindSpec {
    path: "messages.mc-to-discord",
    default_text: "{displayname}: {message}",
    markup: MarkupPolicy::Strip,
    schema: &["username", "displayname", "message", "world", "prefix", "suffix"],
    player_contextual: true,
};

static JOIN: KindSpec = KindSpec {
    path: "messages.join",
    default_text: "{displayname} has joined!",
    markup: MarkupPolicy::Strip,
    schema: PLAYER_EVENT,
    player_contextual: true,
};

static QUIT: KindSpec = KindSpec {
    path: "messages.quit",
    default_text: "{displayname} has left!",
    markup: MarkupPolicy::Strip,
    schema: PLAYER_EVENT,
    player_contextual: true,
};

static DEATH: KindSpec = KindSpec {
    path: "messages.death",
    default_text: "{displayname} has died!",
    markup: MarkupPolicy::Strip,
    schema: PLAYER_EVENT,
    player_contextual: true,
};

static KICK: KindSpec = KindSpec {
    path: "messages.kick",
    default_text: "{displayname} was kicked with reason: {reason}",
    markup: MarkupPolicy::Strip,
    schema: &["username", "displayname", "reason"],
    player_contextual: false,
};

static UNMUTE: KindSpec = KindSpec {
    path: "messages.unmute",
    default_text: "{displayname} has been unmuted.",
    markup: MarkupPolicy::Strip,
    schema: &["username", "displayname"],
    player_contextual: false,
};

static TEMP_MUTE: KindSpec = KindSpec {
    path: "messages.temporary-mute",
    default_text: "{controllerdisplayname} muted {displayname} for {time}",
    markup: MarkupPolicy::Strip,
    schema: &["username", "displayname", "controllername", "controllerdisplayname", "time"],
    player_contextual: false,
};

static TEMP_MUTE_REASON: KindSpec = KindSpec {
    path: "messages.temporary-mute-reason",
    default_text: "{controllerdisplayname} muted {displayname} for {time} with reason: {reason}",
    markup: MarkupPolicy::Strip,
    schema: &[
        "username",
        "displayname",
        "controllername",
        "controllerdisplayname",
        "time",
        "reason",
    ],
    player_contextual: false,
};

static PERM_MUTE: KindSpec = KindSpec {
    path: "messages.permanent-mute",
    default_text: "{controllerdisplayname} permanently muted {displayname}",
    markup: MarkupPolicy::Strip,
    schema: &["username", "displayname", "controllername", "controllerdisplayname"],
    player_contextual: false,
};

static PERM_MUTE_REASON: KindSpec = KindSpec {
    path: "messages.permanent-mute-reason",
    default_text: "{controllerdisplayname} permanently muted {displayname} with reason: {reason}",
    markup: MarkupPolicy::Strip,
    schema: &["username", "displayname", "controllername", "controllerdisplayname", "reason"],
    player_contextual: false,
};

static CONSOLE: KindSpec = KindSpec {
    path: "console.format",
    default_text: "[{timestamp} {level}] {message}",
    markup: MarkupPolicy::Strip,
    schema: &["timestamp", "level", "message"],
    player_contextual: false,
};

impl MessageKind {
    pub const COUNT: usize = 12;

    /// All kinds, in declaration order.
    pub const ALL: [MessageKind; Self::COUNT] = [
        Self::DiscordToMc,
        Self::McToDiscord,
        Self::Join,
        Self::Quit,
        Self::Death,
        Self::Kick,
        Self::Unmute,
        Self::TempMute,
        Self::TempMuteReason,
        Self::PermMute,
        Self::PermMuteReason,
        Self::Console,
    ];

    /// Position in [`Self::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static KindSpec {
        match self {
            Self::DiscordToMc => &DISCORD_TO_MC,
            Self::McToDiscord => &MC_TO_DISCORD,
            Self::Join => &JOIN,
            Self::Quit => &QUIT,
            Self::Death => &DEATH,
            Self::Kick => &KICK,
            Self::Unmute => &UNMUTE,
            Self::TempMute => &TEMP_MUTE,
            Self::TempMuteReason => &TEMP_MUTE_REASON,
            Self::PermMute => &PERM_MUTE,
            Self::PermMuteReason => &PERM_MUTE_REASON,
            Self::Console => &CONSOLE,
        }
    }

    pub fn is_player_contextual(self) -> bool {
        self.spec().player_contextual
    }

    /// Raw template text for this kind, `None` if absent or not a scalar.
    pub fn raw_text(self, store: &ConfigStore) -> Option<String> {
        store.get_text(self.spec().path)
    }

    /// Compile text for this kind with its schema, default and policy.
    pub fn compile(self, raw_text: Option<&str>) -> Template {
        let spec = self.spec();
        TemplateCompiler::compile(raw_text, spec.default_text, spec.markup, spec.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_render() {
        let kick = MessageKind::Kick.compile(None);
        assert_eq!(
            kick.render(&["steve", "Steve", "spamming"]),
            "Steve was kicked with reason: spamming"
        );

        let console = MessageKind::Console.compile(None);
        assert_eq!(
            console.render(&["12:00:00", "INFO", "Done"]),
            "[12:00:00 INFO] Done"
        );

        let discord = MessageKind::DiscordToMc.compile(None);
        assert_eq!(
            discord.render(&["general", "bob", "bob#0001", "Bob", "Bobby", "", "hi"]),
            "[#general] Bob: hi"
        );
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in MessageKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_player_contextual_kinds() {
        let player: Vec<MessageKind> = MessageKind::ALL
            .into_iter()
            .filter(|k| k.is_player_contextual())
            .collect();
        assert_eq!(
            player,
            vec![
                MessageKind::McToDiscord,
                MessageKind::Join,
                MessageKind::Quit,
                MessageKind::Death
            ]
        );
    }

    #[test]
    fn test_raw_text_reads_scalars() {
        let store = ConfigStore::from_value(json!({
            "messages": { "join": "{username} arrived", "quit": 5, "kick": ["x"] },
            "console": { "format": "{message}" }
        }));
        assert_eq!(MessageKind::Join.raw_text(&store).as_deref(), Some("{username} arrived"));
        assert_eq!(MessageKind::Quit.raw_text(&store).as_deref(), Some("5"));
        assert_eq!(MessageKind::Kick.raw_text(&store), None);
        assert_eq!(MessageKind::Death.raw_text(&store), None);
        assert_eq!(MessageKind::Console.raw_text(&store).as_deref(), Some("{message}"));
    }

    #[test]
    fn test_every_default_uses_only_schema_names() {
        for kind in MessageKind::ALL {
            let template = kind.compile(None);
            let args: Vec<String> = (0..kind.spec().schema.len()).map(|i| format!("<{}>", i)).collect();
            assert!(!template.render(&args).contains('{'), "{:?} left a placeholder", kind);
        }
    }
}
