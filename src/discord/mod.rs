//! Discord-facing settings.

pub mod presence;

pub use presence::{ActivityKind, ActivitySelection, PresenceConfig, PresenceStatus};
