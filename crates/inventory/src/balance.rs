//! On-hand balance reduction.
//!
//! Balances are never stored. They are recomputed from the full movement
//! ledger on every query, so they are always consistent with the ledger at
//! read time and there is no running total to keep in sync under edits and
//! deletes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockbook_core::{InventoryError, InventoryResult, LocationId, ProductId};

use crate::catalog::{Location, Product};
use crate::movement::Movement;

/// Current quantity of one product at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub balance: i64,
}

/// Catalog + ledger contents read under one consistent view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub products: Vec<Product>,
    pub locations: Vec<Location>,
    pub movements: Vec<Movement>,
}

/// Net quantity (inflow - outflow) per (product, location), in one pass over the ledger.
///
/// Sums are kept in `i128` so that no ordering of individually valid `i64`
/// quantities can overflow mid-way; range is checked once per reported row.
fn net_quantities(movements: &[Movement]) -> HashMap<(&ProductId, &LocationId), i128> {
    let mut net: HashMap<(&ProductId, &LocationId), i128> = HashMap::new();
    for m in movements {
        if let Some(to) = &m.to_location {
            *net.entry((&m.product_id, to)).or_default() += i128::from(m.qty);
        }
        if let Some(from) = &m.from_location {
            *net.entry((&m.product_id, from)).or_default() -= i128::from(m.qty);
        }
    }
    net
}

/// Balance of every (product, location) pair in the catalog cross product,
/// including zero and negative ones.
///
/// Rows are ordered by product name, then location name (ids break ties).
/// Movements whose product or location is no longer in the catalog do not
/// produce rows.
///
/// Fails with `StorageFailure` when a balance does not fit in an `i64`.
pub fn all_balances(snapshot: &LedgerSnapshot) -> InventoryResult<Vec<BalanceRow>> {
    let net = net_quantities(&snapshot.movements);

    let mut rows = Vec::with_capacity(snapshot.products.len() * snapshot.locations.len());
    for p in &snapshot.products {
        for l in &snapshot.locations {
            let net = net
                .get(&(&p.product_id, &l.location_id))
                .copied()
                .unwrap_or(0);
            let balance = i64::try_from(net).map_err(|_| {
                InventoryError::storage(format!(
                    "balance of product '{}' at location '{}' is out of range ({net})",
                    p.product_id, l.location_id
                ))
            })?;
            rows.push(BalanceRow {
                product_id: p.product_id.clone(),
                product_name: p.name.clone(),
                location_id: l.location_id.clone(),
                location_name: l.name.clone(),
                balance,
            });
        }
    }

    rows.sort_by(|a, b| {
        (&a.product_name, &a.location_name, &a.product_id, &a.location_id).cmp(&(
            &b.product_name,
            &b.location_name,
            &b.product_id,
            &b.location_id,
        ))
    });
    Ok(rows)
}

/// Current stock: pairs with a strictly positive balance.
///
/// Zero and negative balances are omitted; use [`negative_balances`] to see
/// pairs where recorded outflow exceeds recorded inflow.
pub fn compute_balances(snapshot: &LedgerSnapshot) -> InventoryResult<Vec<BalanceRow>> {
    let mut rows = all_balances(snapshot)?;
    rows.retain(|row| row.balance > 0);
    Ok(rows)
}

/// Pairs where more stock was recorded leaving than arriving.
pub fn negative_balances(snapshot: &LedgerSnapshot) -> InventoryResult<Vec<BalanceRow>> {
    let mut rows = all_balances(snapshot)?;
    rows.retain(|row| row.balance < 0);
    Ok(rows)
}
