// Discord adapters for the moderation core.

pub mod commands;
pub mod message_handler;
pub mod platform;

pub use platform::SerenityPlatform;
