//! Settings facade: owns the live snapshot and performs reloads.
//!
//! Reload flow:
//! 1. Load a fresh `ConfigStore` from the source
//! 2. Build a complete `SettingsSnapshot` from it, off to the side
//! 3. Publish it with one atomic swap
//! 4. Run the registered reload hooks
//!
//! Readers never see a half-built snapshot. Anything that needs several
//! consistent reads should take [`SettingsFacade::snapshot`] once and read
//! from that.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};
use serenity::model::id::ChannelId;
use tracing::{debug, info, warn};

use crate::common::error::{SettingsError, SettingsResult};
use crate::common::{PlaceholderExpander, PlayerContext};
use crate::config::{ConfigSource, ConfigStore};
use crate::discord::PresenceConfig;
use crate::game::{MessageKind, Template};
use crate::settings::snapshot::{ChatSettings, CommandSettings, ConsoleSettings, SettingsSnapshot};

/// Callback run once after every successful reload.
pub type ReloadHook = Arc<dyn Fn() + Send + Sync>;

/// Builder for [`SettingsFacade`].
pub struct SettingsFacadeBuilder {
    source: Box<dyn ConfigSource>,
    expander: Option<Arc<dyn PlaceholderExpander>>,
    hooks: Vec<ReloadHook>,
}

impl SettingsFacadeBuilder {
    /// Placeholder engine used for player-contextual templates.
    pub fn expander(mut self, expander: Arc<dyn PlaceholderExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Register a hook to run after each successful reload.
    pub fn on_reload(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Perform the initial load. Hooks are not run for it.
    pub fn build(self) -> SettingsResult<SettingsFacade> {
        let store = ConfigStore::load(self.source.as_ref()).map_err(SettingsError::InitialLoad)?;
        let snapshot = SettingsSnapshot::build(&store, 1);
        info!(
            "Settings loaded from {} ({} channel aliases)",
            self.source.describe(),
            snapshot.channels().len()
        );

        Ok(SettingsFacade {
            source: self.source,
            current: ArcSwap::from_pointee(snapshot),
            reload_lock: Mutex::new(()),
            expander: self.expander,
            hooks: RwLock::new(self.hooks),
        })
    }
}

/// Owner of the current settings snapshot.
pub struct SettingsFacade {
    source: Box<dyn ConfigSource>,
    current: ArcSwap<SettingsSnapshot>,
    /// Serialises reloads so generations stay ordered.
    reload_lock: Mutex<()>,
    expander: Option<Arc<dyn PlaceholderExpander>>,
    hooks: RwLock<Vec<ReloadHook>>,
}

impl SettingsFacade {
    pub fn builder(source: impl ConfigSource + 'static) -> SettingsFacadeBuilder {
        SettingsFacadeBuilder {
            source: Box::new(source),
            expander: None,
            hooks: Vec::new(),
        }
    }

    /// Load settings with no expander and no hooks.
    pub fn load(source: impl ConfigSource + 'static) -> SettingsResult<Self> {
        Self::builder(source).build()
    }

    /// Register another reload hook.
    pub fn on_reload(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks.write().push(Arc::new(hook));
    }

    /// Re-read the source and publish a new snapshot.
    ///
    /// If the source cannot be loaded, nothing changes and the previous
    /// snapshot stays live.
    pub fn reload(&self) -> SettingsResult<Arc<SettingsSnapshot>> {
        let snapshot = {
            let _guard = self.reload_lock.lock();

            let store = ConfigStore::load(self.source.as_ref()).map_err(|e| {
                warn!("Reload from {} failed: {}", self.source.describe(), e);
                SettingsError::Reload(e)
            })?;

            let generation = self.current.load().generation() + 1;
            let snapshot = Arc::new(SettingsSnapshot::build(&store, generation));
            self.current.store(Arc::clone(&snapshot));
            snapshot
        };

        info!(
            "Settings reloaded (generation {}, {} channel aliases)",
            snapshot.generation(),
            snapshot.channels().len()
        );

        // Hooks run outside the reload lock so they may read settings or
        // even trigger another reload.
        let hooks = self.hooks.read().clone();
        debug!("Running {} reload hook(s)", hooks.len());
        for hook in hooks {
            hook();
        }

        Ok(snapshot)
    }

    /// The current snapshot. Hold on to it for consistent multi-field reads.
    pub fn snapshot(&self) -> Arc<SettingsSnapshot> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    pub fn bot_token(&self) -> String {
        self.current.load().bot_token().to_string()
    }

    pub fn guild_id(&self) -> u64 {
        self.current.load().guild_id()
    }

    pub fn primary_channel_id(&self) -> u64 {
        self.current.load().primary_channel_id()
    }

    /// Resolve a channel key (alias or numeric id), 0 when unknown.
    pub fn channel_id(&self, key: &str) -> u64 {
        self.current.load().channel_id(key)
    }

    /// Aliases bound to a channel id, `None` when there are none.
    pub fn channel_keys(&self, id: u64) -> Option<Vec<String>> {
        self.current.load().channel_keys(id).map(<[String]>::to_vec)
    }

    pub fn message_channel(&self, message_type: &str) -> String {
        self.current.load().message_channel(message_type).to_string()
    }

    pub fn route(&self, message_type: &str) -> Option<ChannelId> {
        self.current.load().route(message_type)
    }

    pub fn show_discord_attachments(&self) -> bool {
        self.current.load().show_discord_attachments()
    }

    pub fn show_avatar(&self) -> bool {
        self.current.load().show_avatar()
    }

    pub fn show_name(&self) -> bool {
        self.current.load().show_name()
    }

    pub fn always_receive_primary(&self) -> bool {
        self.current.load().always_receive_primary()
    }

    pub fn permitted_formatting_roles(&self) -> Vec<String> {
        self.current.load().permitted_formatting_roles().to_vec()
    }

    pub fn chat(&self) -> ChatSettings {
        self.current.load().chat().clone()
    }

    pub fn console(&self) -> ConsoleSettings {
        self.current.load().console().clone()
    }

    pub fn command(&self, name: &str) -> CommandSettings {
        self.current.load().command(name).clone()
    }

    pub fn is_command_enabled(&self, name: &str) -> bool {
        self.current.load().is_command_enabled(name)
    }

    pub fn is_command_ephemeral(&self, name: &str) -> bool {
        self.current.load().is_command_ephemeral(name)
    }

    pub fn command_allowed_roles(&self, name: &str) -> Vec<String> {
        self.current.load().command_allowed_roles(name).to_vec()
    }

    pub fn command_admin_roles(&self, name: &str) -> Vec<String> {
        self.current.load().command_admin_roles(name).to_vec()
    }

    pub fn presence(&self) -> PresenceConfig {
        self.current.load().presence().clone()
    }

    /// Template compiled at the last reload, `None` for player-contextual
    /// kinds. Those go through [`Self::player_template`].
    pub fn template(&self, kind: MessageKind) -> Option<Template> {
        self.current.load().template(kind).cloned()
    }

    pub fn discord_to_mc_format(&self) -> Template {
        self.current.load().discord_to_mc_format().clone()
    }

    pub fn kick_format(&self) -> Template {
        self.current.load().kick_format().clone()
    }

    pub fn unmute_format(&self) -> Template {
        self.current.load().unmute_format().clone()
    }

    pub fn temp_mute_format(&self) -> Template {
        self.current.load().temp_mute_format().clone()
    }

    pub fn temp_mute_reason_format(&self) -> Template {
        self.current.load().temp_mute_reason_format().clone()
    }

    pub fn perm_mute_format(&self) -> Template {
        self.current.load().perm_mute_format().clone()
    }

    pub fn perm_mute_reason_format(&self) -> Template {
        self.current.load().perm_mute_reason_format().clone()
    }

    pub fn console_format(&self) -> Template {
        self.current.load().console_format().clone()
    }

    /// Compile a player-contextual template for `player`, running the
    /// configured expander first. Compiled fresh on every call.
    pub fn player_template(&self, kind: MessageKind, player: &PlayerContext) -> Template {
        self.current
            .load()
            .player_template(kind, player, self.expander.as_deref())
    }

    pub fn mc_to_discord_format(&self, player: &PlayerContext) -> Template {
        self.player_template(MessageKind::McToDiscord, player)
    }

    pub fn join_format(&self, player: &PlayerContext) -> Template {
        self.player_template(MessageKind::Join, player)
    }

    pub fn quit_format(&self, player: &PlayerContext) -> Template {
        self.player_template(MessageKind::Quit, player)
    }

    pub fn death_format(&self, player: &PlayerContext) -> Template {
        self.player_template(MessageKind::Death, player)
    }
}
