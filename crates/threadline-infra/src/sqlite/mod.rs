//! SQLite storage: connection pool and the transactional conversation store.

pub mod conversation;
pub mod pool;

pub use conversation::SqliteConversationStore;
pub use pool::{DatabasePool, default_database_url};
