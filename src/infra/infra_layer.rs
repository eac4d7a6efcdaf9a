// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

pub mod database;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "audit/mod.rs"]
pub mod audit;

#[path = "memory/mod.rs"]
pub mod memory;
