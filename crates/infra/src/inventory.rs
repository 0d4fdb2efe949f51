use std::sync::Arc;

use tracing::instrument;

use stockbook_core::InventoryResult;
use stockbook_inventory::{Location, Product};

use crate::balance::BalanceEngine;
use crate::catalog::Catalog;
use crate::config::{InventoryConfig, ReferencePolicy, StoreBackend};
use crate::ledger::MovementLedger;
use crate::store::{InMemoryInventoryStore, SharedStore, SqliteInventoryStore, SqliteStoreOptions};

/// The three inventory components wired to one shared store.
#[derive(Clone)]
pub struct Inventory {
    pub products: Catalog<Product>,
    pub locations: Catalog<Location>,
    pub ledger: MovementLedger,
    pub balances: BalanceEngine,
}

impl Inventory {
    /// Build the configured store (migrating SQLite if needed) and wire the
    /// components on top of it.
    #[instrument(skip(config), fields(policy = ?config.reference_policy), err)]
    pub async fn open(config: &InventoryConfig) -> InventoryResult<Self> {
        let store: SharedStore = match &config.store {
            StoreBackend::InMemory => {
                tracing::info!("using in-memory inventory store");
                Arc::new(InMemoryInventoryStore::new())
            }
            StoreBackend::Sqlite { url } => {
                let options = SqliteStoreOptions {
                    max_connections: config.max_connections,
                    foreign_keys: config.reference_policy.is_enforced(),
                };
                Arc::new(SqliteInventoryStore::connect(url, options).await?)
            }
        };

        Ok(Self::with_store(store, config.reference_policy))
    }

    pub fn with_store(store: SharedStore, policy: ReferencePolicy) -> Self {
        Self {
            products: Catalog::new(store.clone(), policy),
            locations: Catalog::new(store.clone(), policy),
            ledger: MovementLedger::new(store.clone(), policy),
            balances: BalanceEngine::new(store),
        }
    }
}
