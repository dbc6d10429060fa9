pub mod api;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use api::ApiStorage;
pub use memory::MemoryStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::{SQLiteConnector, SQLiteStorage};
