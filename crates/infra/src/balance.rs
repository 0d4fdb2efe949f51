use tracing::instrument;

use stockbook_core::InventoryResult;
use stockbook_inventory::{BalanceRow, all_balances, negative_balances};

use crate::store::SharedStore;

/// Derives per-(product, location) stock levels from the ledger.
///
/// Nothing is cached: every call reads a fresh snapshot and reduces it.
#[derive(Clone)]
pub struct BalanceEngine {
    store: SharedStore,
}

impl BalanceEngine {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Positive balances, ordered by product name then location name.
    ///
    /// Negative balances are left out of the result and logged at `warn`;
    /// see [`discrepancies`](Self::discrepancies).
    #[instrument(skip(self), err)]
    pub async fn compute(&self) -> InventoryResult<Vec<BalanceRow>> {
        let snapshot = self.store.snapshot().await?;

        let mut rows = all_balances(&snapshot)?;
        for row in rows.iter().filter(|row| row.balance < 0) {
            tracing::warn!(
                product_id = %row.product_id,
                location_id = %row.location_id,
                balance = row.balance,
                "negative balance hidden from stock report"
            );
        }
        rows.retain(|row| row.balance > 0);

        tracing::debug!(
            rows = rows.len(),
            movements = snapshot.movements.len(),
            "balances computed"
        );
        Ok(rows)
    }

    /// Pairs whose outflow exceeds inflow.
    pub async fn discrepancies(&self) -> InventoryResult<Vec<BalanceRow>> {
        let snapshot = self.store.snapshot().await?;
        negative_balances(&snapshot)
    }
}
