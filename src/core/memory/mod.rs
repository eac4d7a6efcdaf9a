// Conversation memory - bounded per-user chat history for the AI collaborator.
// Shares the SQLite database with moderation but none of its invariants.

pub mod memory_models;
pub mod memory_service;

pub use memory_models::*;
pub use memory_service::*;
