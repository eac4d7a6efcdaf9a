// Core moderation module - profanity detection and warn/mute/ban escalation.
// Following the same pattern as the audit and memory modules.

pub mod escalation_engine;
pub mod moderation_models;
pub mod moderation_ports;
pub mod moderation_service;
pub mod normalizer;
pub mod profanity_filter;

#[cfg(test)]
pub mod test_support;

pub use escalation_engine::*;
pub use moderation_models::*;
pub use moderation_ports::*;
pub use moderation_service::*;
pub use profanity_filter::ProfanityFilter;
