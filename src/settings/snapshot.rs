//! One complete, internally consistent generation of settings.

use std::collections::HashMap;
use std::num::NonZeroU64;

use chrono::Local;
use serde::Serialize;
use serenity::model::id::{ChannelId, RoleId};

use crate::bridge::{ChannelDirectory, MessageRoutes};
use crate::common::{PlaceholderExpander, PlayerContext};
use crate::config::ConfigStore;
use crate::discord::PresenceConfig;
use crate::game::{MessageKind, Template};

pub const DEFAULT_DISCORD_MAX_LENGTH: usize = 2000;
pub const DEFAULT_CONSOLE_WEBHOOK_NAME: &str = "Console Relay";

/// Permission data for one bot command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSettings {
    pub enabled: bool,
    /// Reply only to the invoking user.
    pub ephemeral: bool,
    pub allowed_roles: Vec<String>,
    pub admin_roles: Vec<String>,
}

static DEFAULT_COMMAND: CommandSettings = CommandSettings {
    enabled: true,
    ephemeral: true,
    allowed_roles: Vec::new(),
    admin_roles: Vec::new(),
};

impl Default for CommandSettings {
    fn default() -> Self {
        DEFAULT_COMMAND.clone()
    }
}

impl CommandSettings {
    fn from_store(store: &ConfigStore, command: &str) -> Self {
        let path = |field: &str| format!("commands.{}.{}", command, field);
        Self {
            enabled: store.get_bool(&path("enabled"), DEFAULT_COMMAND.enabled),
            ephemeral: store.get_bool(&path("hide-command"), DEFAULT_COMMAND.ephemeral),
            allowed_roles: store.get_string_list(&path("allowed-roles")),
            admin_roles: store.get_string_list(&path("admin-roles")),
        }
    }

    pub fn allowed_role_ids(&self) -> Vec<RoleId> {
        role_ids(&self.allowed_roles)
    }

    pub fn admin_role_ids(&self) -> Vec<RoleId> {
        role_ids(&self.admin_roles)
    }
}

/// Parse snowflake strings, skipping anything that is not a non-zero id.
/// Role names and `*` are left to the permission layer.
fn role_ids(roles: &[String]) -> Vec<RoleId> {
    roles
        .iter()
        .filter_map(|role| role.trim().parse::<u64>().ok())
        .filter_map(NonZeroU64::new)
        .map(RoleId::from)
        .collect()
}

/// Chat relay limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChatSettings {
    pub discord_max_length: usize,
    pub filter_newlines: bool,
}

impl ChatSettings {
    fn from_store(store: &ConfigStore) -> Self {
        let max = store.get_i64("chat.discord-max-length", DEFAULT_DISCORD_MAX_LENGTH as i64);
        let discord_max_length = usize::try_from(max)
            .ok()
            .filter(|&len| len > 0)
            .unwrap_or(DEFAULT_DISCORD_MAX_LENGTH);
        Self {
            discord_max_length,
            filter_newlines: store.get_bool("chat.filter-newlines", true),
        }
    }

    /// Prepare a Discord message for the game: fold newlines when
    /// filtering is on, then cap the length in characters.
    pub fn sanitize_discord_message(&self, message: &str) -> String {
        let folded = if self.filter_newlines {
            message.replace("\r\n", " ").replace(['\n', '\r'], " ")
        } else {
            message.to_string()
        };
        match folded.char_indices().nth(self.discord_max_length) {
            Some((cut, _)) => folded[..cut].to_string(),
            None => folded,
        }
    }
}

/// Console relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Channel key (alias or id), `"none"` when disabled.
    pub channel: String,
    pub webhook_name: String,
    pub command_relay: bool,
    pub format: Template,
}

impl ConsoleSettings {
    fn from_store(store: &ConfigStore) -> Self {
        Self {
            channel: store.get_string("console.channel", "none"),
            webhook_name: store.get_string("console.webhook-name", DEFAULT_CONSOLE_WEBHOOK_NAME),
            command_relay: store.get_bool("console.command-relay", false),
            format: MessageKind::Console.compile(MessageKind::Console.raw_text(store).as_deref()),
        }
    }

    /// Render one console line stamped with the local time.
    pub fn render_line(&self, level: &str, message: &str) -> String {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.format.render(&[timestamp.as_str(), level, message])
    }
}

/// Templates compiled once per reload.
///
/// Only kinds whose text is the same for every player live here. Console
/// is kept on [`ConsoleSettings`] and player-contextual kinds are compiled
/// per call by [`SettingsSnapshot::player_template`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct FixedTemplates {
    discord_to_mc: Template,
    kick: Template,
    unmute: Template,
    temp_mute: Template,
    temp_mute_reason: Template,
    perm_mute: Template,
    perm_mute_reason: Template,
}

impl FixedTemplates {
    fn from_store(store: &ConfigStore) -> Self {
        let compile = |kind: MessageKind| kind.compile(kind.raw_text(store).as_deref());
        Self {
            discord_to_mc: compile(MessageKind::DiscordToMc),
            kick: compile(MessageKind::Kick),
            unmute: compile(MessageKind::Unmute),
            temp_mute: compile(MessageKind::TempMute),
            temp_mute_reason: compile(MessageKind::TempMuteReason),
            perm_mute: compile(MessageKind::PermMute),
            perm_mute_reason: compile(MessageKind::PermMuteReason),
        }
    }
}

/// Every resolved setting from one reload.
#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    generation: u64,
    bot_token: String,
    guild_id: u64,
    primary_channel_id: u64,
    channels: ChannelDirectory,
    routes: MessageRoutes,
    show_discord_attachments: bool,
    show_avatar: bool,
    show_name: bool,
    always_receive_primary: bool,
    permitted_formatting_roles: Vec<String>,
    chat: ChatSettings,
    console: ConsoleSettings,
    commands: HashMap<String, CommandSettings>,
    presence: PresenceConfig,
    templates: FixedTemplates,
    /// Raw text of player-contextual kinds, indexed by [`MessageKind::index`].
    raw_texts: [Option<String>; MessageKind::COUNT],
}

impl SettingsSnapshot {
    /// Resolve everything from one loaded store. Never fails; every field
    /// has a default.
    pub fn build(store: &ConfigStore, generation: u64) -> Self {
        let channels = store
            .section("channels")
            .map(ChannelDirectory::rebuild)
            .unwrap_or_default();

        let commands = store
            .section("commands")
            .into_iter()
            .flatten()
            .filter(|(_, value)| value.is_object())
            .map(|(name, _)| (name.clone(), CommandSettings::from_store(store, name)))
            .collect();

        let raw_texts = MessageKind::ALL.map(|kind| {
            kind.is_player_contextual()
                .then(|| kind.raw_text(store))
                .flatten()
        });

        Self {
            generation,
            bot_token: store.get_string("token", ""),
            guild_id: store.get_u64("guild", 0),
            primary_channel_id: store.get_u64("channels.primary", 0),
            channels,
            routes: MessageRoutes::from_section(store.section("message-types")),
            show_discord_attachments: store.get_bool("show-discord-attachments", true),
            show_avatar: store.get_bool("show-avatar", false),
            show_name: store.get_bool("show-name", false),
            always_receive_primary: store.get_bool("always-receive-primary", false),
            permitted_formatting_roles: store.get_string_list("permit-formatting-roles"),
            chat: ChatSettings::from_store(store),
            console: ConsoleSettings::from_store(store),
            commands,
            presence: PresenceConfig::from_store(store),
            templates: FixedTemplates::from_store(store),
            raw_texts,
        }
    }

    /// Reload generation this snapshot came from. Starts at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn guild_id(&self) -> u64 {
        self.guild_id
    }

    pub fn primary_channel_id(&self) -> u64 {
        self.primary_channel_id
    }

    pub fn channels(&self) -> &ChannelDirectory {
        &self.channels
    }

    /// Resolve a channel key (alias or numeric id), 0 when unknown.
    pub fn channel_id(&self, key: &str) -> u64 {
        self.channels.resolve(key)
    }

    /// Aliases bound to a channel id, in declaration order.
    pub fn channel_keys(&self, id: u64) -> Option<&[String]> {
        self.channels.reverse_lookup(id)
    }

    /// Routing key configured for a message type, `"none"` if unset.
    pub fn message_channel(&self, message_type: &str) -> &str {
        self.routes.channel_key(message_type)
    }

    /// Destination channel for a message type, if it is routed anywhere.
    pub fn route(&self, message_type: &str) -> Option<ChannelId> {
        self.routes.route(message_type, &self.channels)
    }

    pub fn show_discord_attachments(&self) -> bool {
        self.show_discord_attachments
    }

    pub fn show_avatar(&self) -> bool {
        self.show_avatar
    }

    pub fn show_name(&self) -> bool {
        self.show_name
    }

    pub fn always_receive_primary(&self) -> bool {
        self.always_receive_primary
    }

    pub fn permitted_formatting_roles(&self) -> &[String] {
        &self.permitted_formatting_roles
    }

    pub fn chat(&self) -> &ChatSettings {
        &self.chat
    }

    pub fn console(&self) -> &ConsoleSettings {
        &self.console
    }

    /// Settings for a command; unconfigured commands get the defaults.
    pub fn command(&self, name: &str) -> &CommandSettings {
        self.commands.get(name).unwrap_or(&DEFAULT_COMMAND)
    }

    pub fn is_command_enabled(&self, name: &str) -> bool {
        self.command(name).enabled
    }

    pub fn is_command_ephemeral(&self, name: &str) -> bool {
        self.command(name).ephemeral
    }

    pub fn command_allowed_roles(&self, name: &str) -> &[String] {
        &self.command(name).allowed_roles
    }

    pub fn command_admin_roles(&self, name: &str) -> &[String] {
        &self.command(name).admin_roles
    }

    pub fn presence(&self) -> &PresenceConfig {
        &self.presence
    }

    /// Template compiled at reload time.
    ///
    /// `None` for player-contextual kinds, which only exist per player
    /// through [`Self::player_template`].
    pub fn template(&self, kind: MessageKind) -> Option<&Template> {
        match kind {
            MessageKind::DiscordToMc => Some(&self.templates.discord_to_mc),
            MessageKind::Kick => Some(&self.templates.kick),
            MessageKind::Unmute => Some(&self.templates.unmute),
            MessageKind::TempMute => Some(&self.templates.temp_mute),
            MessageKind::TempMuteReason => Some(&self.templates.temp_mute_reason),
            MessageKind::PermMute => Some(&self.templates.perm_mute),
            MessageKind::PermMuteReason => Some(&self.templates.perm_mute_reason),
            MessageKind::Console => Some(&self.console.format),
            MessageKind::McToDiscord | MessageKind::Join | MessageKind::Quit | MessageKind::Death => {
                None
            }
        }
    }

    pub fn discord_to_mc_format(&self) -> &Template {
        &self.templates.discord_to_mc
    }

    pub fn kick_format(&self) -> &Template {
        &self.templates.kick
    }

    pub fn unmute_format(&self) -> &Template {
        &self.templates.unmute
    }

    pub fn temp_mute_format(&self) -> &Template {
        &self.templates.temp_mute
    }

    pub fn temp_mute_reason_format(&self) -> &Template {
        &self.templates.temp_mute_reason
    }

    pub fn perm_mute_format(&self) -> &Template {
        &self.templates.perm_mute
    }

    pub fn perm_mute_reason_format(&self) -> &Template {
        &self.templates.perm_mute_reason
    }

    pub fn console_format(&self) -> &Template {
        &self.console.format
    }

    /// Compile a template for one player.
    ///
    /// For player-contextual kinds the raw text runs through `expander`
    /// first, then gets compiled. This happens on every call; the result
    /// depends on the player. Other kinds return their reload-time template.
    pub fn player_template(
        &self,
        kind: MessageKind,
        player: &PlayerContext,
        expander: Option<&dyn PlaceholderExpander>,
    ) -> Template {
        if let Some(fixed) = self.template(kind) {
            return fixed.clone();
        }
        let raw = self.raw_texts[kind.index()].as_deref();
        match (raw, expander) {
            (Some(raw), Some(expander)) => kind.compile(Some(&expander.expand(player, raw))),
            (raw, _) => kind.compile(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> SettingsSnapshot {
        SettingsSnapshot::build(&ConfigStore::from_value(value), 1)
    }

    #[test]
    fn test_defaults_on_empty_config() {
        let s = snapshot(json!({}));
        assert_eq!(s.bot_token(), "");
        assert_eq!(s.guild_id(), 0);
        assert_eq!(s.primary_channel_id(), 0);
        assert!(s.channels().is_empty());
        assert_eq!(s.message_channel("chat"), "none");
        assert!(s.show_discord_attachments());
        assert!(!s.show_avatar());
        assert!(!s.show_name());
        assert!(!s.always_receive_primary());
        assert_eq!(s.chat().discord_max_length, 2000);
        assert!(s.chat().filter_newlines);
        assert_eq!(s.console().channel, "none");
        assert_eq!(s.console().webhook_name, DEFAULT_CONSOLE_WEBHOOK_NAME);
        assert!(!s.console().command_relay);
        assert!(s.is_command_enabled("execute"));
        assert!(s.is_command_ephemeral("execute"));
        assert!(s.command_allowed_roles("execute").is_empty());
        assert_eq!(s.presence(), &PresenceConfig::default());
    }

    #[test]
    fn test_scalars_and_channels() {
        let s = snapshot(json!({
            "token": "abc",
            "guild": 42,
            "channels": { "primary": 100, "staff": 200 },
            "message-types": { "chat": "primary", "join": "staff", "kick": "none" },
            "show-avatar": true
        }));
        assert_eq!(s.bot_token(), "abc");
        assert_eq!(s.guild_id(), 42);
        assert_eq!(s.primary_channel_id(), 100);
        assert_eq!(s.channel_id("staff"), 200);
        assert_eq!(s.channel_keys(100).unwrap(), ["primary"]);
        assert_eq!(s.route("join").map(|c| c.get()), Some(200));
        assert!(s.route("kick").is_none());
        assert!(s.show_avatar());
    }

    #[test]
    fn test_command_settings() {
        let s = snapshot(json!({
            "commands": {
                "execute": {
                    "enabled": false,
                    "hide-command": false,
                    "allowed-roles": ["123", "moderators", 456],
                    "admin-roles": ["0", "789"]
                },
                "broken": "not a mapping"
            }
        }));
        let execute = s.command("execute");
        assert!(!execute.enabled);
        assert!(!execute.ephemeral);
        assert_eq!(execute.allowed_roles, vec!["123", "moderators", "456"]);
        let allowed: Vec<u64> = execute.allowed_role_ids().iter().map(|r| r.get()).collect();
        assert_eq!(allowed, vec![123, 456]);
        let admin: Vec<u64> = execute.admin_role_ids().iter().map(|r| r.get()).collect();
        assert_eq!(admin, vec![789]);
        assert_eq!(s.command("broken"), &CommandSettings::default());
    }

    #[test]
    fn test_chat_limits_and_sanitizing() {
        let s = snapshot(json!({ "chat": { "discord-max-length": 5, "filter-newlines": true } }));
        assert_eq!(s.chat().sanitize_discord_message("a\nb\r\ncdef"), "a b c");
        assert_eq!(s.chat().sanitize_discord_message("héllo wörld"), "héllo");

        let keep = snapshot(json!({ "chat": { "filter-newlines": false } }));
        assert_eq!(keep.chat().sanitize_discord_message("a\nb"), "a\nb");

        let negative = snapshot(json!({ "chat": { "discord-max-length": -3 } }));
        assert_eq!(negative.chat().discord_max_length, DEFAULT_DISCORD_MAX_LENGTH);
    }

    #[test]
    fn test_console_render_line() {
        let s = snapshot(json!({ "console": { "format": "&7{level}|{message}" } }));
        assert_eq!(s.console().render_line("WARN", "Low memory"), "WARN|Low memory");

        let default = snapshot(json!({}));
        let line = default.console().render_line("INFO", "Done");
        assert!(line.starts_with('['));
        assert!(line.ends_with(" INFO] Done"));
    }

    #[test]
    fn test_templates_compiled_per_kind() {
        let s = snapshot(json!({
            "messages": {
                "kick": "{displayname} kicked: {reason} {bogus}",
                "discord-to-mc": "&6{channel}&r {message}"
            }
        }));
        assert_eq!(
            s.kick_format().render(&["steve", "Steve", "afk"]),
            "Steve kicked: afk {bogus}"
        );
        let args = ["general", "", "", "", "", "", "hi"];
        assert_eq!(s.discord_to_mc_format().render(&args), "&6general&r hi");
        assert_eq!(
            s.template(MessageKind::Unmute).unwrap().render(&["steve", "Steve"]),
            "Steve has been unmuted."
        );
    }

    #[test]
    fn test_player_kinds_never_cached() {
        let s = snapshot(json!({
            "messages": { "join": "%rank% {displayname}", "kick": "{reason}" }
        }));
        for kind in MessageKind::ALL {
            assert_eq!(
                s.template(kind).is_none(),
                kind.is_player_contextual(),
                "{:?}",
                kind
            );
        }

        let expander = |_: &PlayerContext, raw: &str| raw.replace("%rank%", "[A]");
        let player = PlayerContext::new("admin", "Admin");
        let kick = s.player_template(MessageKind::Kick, &player, Some(&expander));
        assert_eq!(&kick, s.kick_format());
    }

    #[test]
    fn test_console_template_shared() {
        let s = snapshot(json!({ "console": { "format": "{level}: {message}" } }));
        let cached = s.template(MessageKind::Console).unwrap();
        assert!(std::ptr::eq(cached, &s.console().format));
        assert!(std::ptr::eq(s.console_format(), &s.console().format));
        assert_eq!(s.console().render_line("INFO", "up"), "INFO: up");
    }

    #[test]
    fn test_numeric_scalars_read_as_text() {
        let s = snapshot(json!({
            "channels": { "primary": 100 },
            "console": { "channel": 123456789012345678u64 },
            "message-types": { "chat": 123456789012345678u64 },
            "presence": { "message": 2024 }
        }));
        assert_eq!(s.console().channel, "123456789012345678");
        assert_eq!(s.channel_id(&s.console().channel), 123456789012345678);
        assert_eq!(s.route("chat").map(|c| c.get()), Some(123456789012345678));
        assert_eq!(s.presence().activity_message, "2024");
    }

    #[test]
    fn test_player_template_expands_each_call() {
        let s = snapshot(json!({ "messages": { "join": "%rank% {displayname} joined" } }));
        let expander = |player: &PlayerContext, raw: &str| {
            raw.replace("%rank%", if player.username == "admin" { "[A]" } else { "[M]" })
        };

        let admin = PlayerContext::new("admin", "Admin");
        let member = PlayerContext::new("steve", "Steve");
        let args_admin = [admin.username.as_str(), admin.display_name.as_str(), ""];
        let args_member = [member.username.as_str(), member.display_name.as_str(), ""];

        let t1 = s.player_template(MessageKind::Join, &admin, Some(&expander));
        let t2 = s.player_template(MessageKind::Join, &member, Some(&expander));
        assert_eq!(t1.render(&args_admin), "[A] Admin joined");
        assert_eq!(t2.render(&args_member), "[M] Steve joined");

        let plain = s.player_template(MessageKind::Join, &member, None);
        assert_eq!(plain.render(&args_member), "%rank% Steve joined");
    }

    #[test]
    fn test_player_template_default_not_expanded() {
        let s = snapshot(json!({}));
        let expander = |_: &PlayerContext, _: &str| "should not run".to_string();
        let template = s.player_template(
            MessageKind::Death,
            &PlayerContext::new("steve", "Steve"),
            Some(&expander),
        );
        assert_eq!(template.render(&["steve", "Steve", ""]), "Steve has died!");
    }
}
