//! Channel resolution and message routing.
//!
//! - `channels`: alias <-> channel id directory
//! - `routing`: which channel each message type is relayed to

pub mod channels;
pub mod routing;

pub use channels::{ChannelDirectory, ChannelLookup, NO_CHANNEL};
pub use routing::MessageRoutes;
