//! Storage boundary for the catalog and the movement ledger.
//!
//! The relational engine is an external collaborator: components talk to it
//! only through [`InventoryStore`], with an in-memory implementation for
//! tests/dev and a SQLite implementation for durable use.

pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use r#trait::{CatalogRecord, InventoryStore, SharedStore};
pub use sqlite::{SqliteInventoryStore, SqliteStoreOptions};
