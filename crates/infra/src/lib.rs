//! Infrastructure layer: storage backends, configuration, and the inventory
//! components (catalog, movement ledger, balance engine) wired on top of them.

pub mod balance;
pub mod catalog;
pub mod config;
pub mod inventory;
pub mod ledger;
pub mod store;

pub use balance::BalanceEngine;
pub use catalog::Catalog;
pub use config::{InventoryConfig, ReferencePolicy, StoreBackend};
pub use inventory::Inventory;
pub use ledger::{MovementLedger, MovementView};
pub use store::{
    CatalogRecord, InMemoryInventoryStore, InventoryStore, SharedStore, SqliteInventoryStore,
    SqliteStoreOptions,
};
