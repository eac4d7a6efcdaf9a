// Core audit module - append-only record of moderation actions.

pub mod audit_log;
pub mod audit_models;

pub use audit_log::*;
pub use audit_models::*;
