pub mod sqlite_memory_store;

pub use sqlite_memory_store::SqliteMemoryStore;
