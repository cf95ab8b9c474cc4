//! Settings snapshot and the facade that publishes it.
//!
//! - `snapshot`: one immutable, fully resolved generation of settings
//! - `facade`: owns the live snapshot, reloads and notifies hooks

pub mod facade;
pub mod snapshot;

pub use facade::{ReloadHook, SettingsFacade, SettingsFacadeBuilder};
pub use snapshot::{ChatSettings, CommandSettings, ConsoleSettings, SettingsSnapshot};
