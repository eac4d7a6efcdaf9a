// Implementations of the moderation storage ports.

pub mod json_word_list_store;
pub mod sqlite_infraction_store;

pub use json_word_list_store::JsonWordListStore;
pub use sqlite_infraction_store::SqliteInfractionStore;
