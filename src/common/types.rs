//! Shared types used across the settings layer.

/// The player an event is about.
///
/// Handed to the placeholder expander so per-player tokens can be filled in
/// before a player-contextual template is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerContext {
    pub username: String,
    pub display_name: String,
    pub world: Option<String>,
}

impl PlayerContext {
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            world: None,
        }
    }

    /// Set the world the player is in.
    pub fn with_world(mut self, world: impl Into<String>) -> Self {
        self.world = Some(world.into());
        self
    }
}

/// Expands player-specific tokens in raw template text.
///
/// Implemented by whatever placeholder engine the host provides. It runs
/// before positional compilation, so anything it leaves behind in `{name}`
/// form is still picked up by the template schema.
pub trait PlaceholderExpander: Send + Sync {
    fn expand(&self, player: &PlayerContext, raw: &str) -> String;
}

impl<F> PlaceholderExpander for F
where
    F: Fn(&PlayerContext, &str) -> String + Send + Sync,
{
    fn expand(&self, player: &PlayerContext, raw: &str) -> String {
        self(player, raw)
    }
}
