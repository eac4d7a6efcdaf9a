// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "audit/mod.rs"]
pub mod audit;

#[path = "memory/mod.rs"]
pub mod memory;
