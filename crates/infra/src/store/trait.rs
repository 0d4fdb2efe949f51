use std::sync::Arc;

use stockbook_core::{InventoryError, InventoryResult, LocationId, MovementId, ProductId};
use stockbook_inventory::{
    CatalogEntry, CatalogKind, LedgerSnapshot, Location, Movement, Product, ValidMovement,
};

use crate::config::ReferencePolicy;

/// A catalog row as the storage layer sees it: plain identifier + name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
}

impl CatalogRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Convert a stored row back into a typed catalog entry.
    ///
    /// Rows are validated on the way in, so a failure here means the backing
    /// store holds data this crate did not write.
    pub fn into_entry<E: CatalogEntry>(self) -> InventoryResult<E> {
        let id = E::parse_id(&self.id).map_err(|e| {
            InventoryError::storage(format!("corrupt {} row '{}': {e}", E::KIND, self.id))
        })?;
        Ok(E::from_parts(id, self.name))
    }
}

/// Durable storage for products, locations and movements.
///
/// ## Atomicity
///
/// Every method is one logical operation and must be applied atomically:
/// a write either fully happens or leaves no trace. `snapshot()` must read
/// catalog and ledger under one consistent view so that a concurrent edit can
/// never be half-reflected in a balance computation.
///
/// ## Validation
///
/// Implementations do not validate inputs; callers hand them already
/// validated values. Implementations do enforce identity uniqueness and
/// report a clash as `InventoryError::DuplicateIdentity`.
///
/// ## Rows affected
///
/// `rename_entry`, `delete_entry`, `update_movement` and `delete_movement`
/// return the number of rows touched (0 or 1) and leave the not-found policy
/// to the caller.
///
/// ## References
///
/// Under [`ReferencePolicy::Enforced`], `insert_movement` and
/// `update_movement` fail with `InvalidArgument` when the product or an
/// endpoint is not registered, and `delete_entry` fails with
/// `InvalidArgument` while a movement still names the entry. The check runs
/// inside the same atomic unit as the write it guards.
#[async_trait::async_trait]
pub trait InventoryStore: Send + Sync {
    async fn insert_entry(&self, kind: CatalogKind, record: CatalogRecord) -> InventoryResult<()>;

    async fn rename_entry(&self, kind: CatalogKind, id: &str, name: &str) -> InventoryResult<u64>;

    async fn delete_entry(
        &self,
        kind: CatalogKind,
        id: &str,
        policy: ReferencePolicy,
    ) -> InventoryResult<u64>;

    async fn get_entry(
        &self,
        kind: CatalogKind,
        id: &str,
    ) -> InventoryResult<Option<CatalogRecord>>;

    /// All entries of `kind`, ordered by identifier ascending.
    async fn list_entries(&self, kind: CatalogKind) -> InventoryResult<Vec<CatalogRecord>>;

    async fn insert_movement(
        &self,
        movement: &Movement,
        policy: ReferencePolicy,
    ) -> InventoryResult<()>;

    /// Replace from/to/product/qty, keeping identity and timestamp.
    async fn update_movement(
        &self,
        id: MovementId,
        edit: &ValidMovement,
        policy: ReferencePolicy,
    ) -> InventoryResult<u64>;

    async fn delete_movement(&self, id: MovementId) -> InventoryResult<u64>;

    async fn get_movement(&self, id: MovementId) -> InventoryResult<Option<Movement>>;

    /// All movements, most recent first (ties broken by identifier, descending).
    async fn list_movements(&self) -> InventoryResult<Vec<Movement>>;

    /// Products, locations and movements read under a single consistent view.
    async fn snapshot(&self) -> InventoryResult<LedgerSnapshot>;
}

/// Storage handle shared by the inventory components.
pub type SharedStore = Arc<dyn InventoryStore>;

/// Assemble a typed snapshot from raw catalog rows.
pub(crate) fn typed_snapshot(
    products: Vec<CatalogRecord>,
    locations: Vec<CatalogRecord>,
    movements: Vec<Movement>,
) -> InventoryResult<LedgerSnapshot> {
    Ok(LedgerSnapshot {
        products: products
            .into_iter()
            .map(CatalogRecord::into_entry::<Product>)
            .collect::<InventoryResult<_>>()?,
        locations: locations
            .into_iter()
            .map(CatalogRecord::into_entry::<Location>)
            .collect::<InventoryResult<_>>()?,
        movements,
    })
}

/// Catalog entries a movement names: its product, then each endpoint present.
pub(crate) fn movement_references<'a>(
    product_id: &'a ProductId,
    from_location: Option<&'a LocationId>,
    to_location: Option<&'a LocationId>,
) -> Vec<(CatalogKind, &'a str)> {
    std::iter::once((CatalogKind::Product, product_id.as_str()))
        .chain(from_location.map(|l| (CatalogKind::Location, l.as_str())))
        .chain(to_location.map(|l| (CatalogKind::Location, l.as_str())))
        .collect()
}

pub(crate) fn unknown_reference(kind: CatalogKind, id: &str) -> InventoryError {
    InventoryError::invalid(format!("unknown {kind} '{id}'"))
}

pub(crate) fn still_referenced(kind: CatalogKind, id: &str, movements: u64) -> InventoryError {
    InventoryError::invalid(format!(
        "{kind} '{id}' is still referenced by {movements} movement(s)"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_convert_into_typed_entries() {
        let p: Product = CatalogRecord::new("P1", "Widget").into_entry().unwrap();
        assert_eq!(p.product_id.as_str(), "P1");
        assert_eq!(p.name, "Widget");
    }

    #[test]
    fn blank_stored_ids_surface_as_storage_failures() {
        let err = CatalogRecord::new("", "Ghost")
            .into_entry::<Location>()
            .unwrap_err();
        assert!(matches!(err, InventoryError::StorageFailure(_)));
    }

    #[test]
    fn movement_references_list_product_then_endpoints() {
        let product = ProductId::parse("P1").unwrap();
        let from = LocationId::parse("L1").unwrap();
        let to = LocationId::parse("L2").unwrap();

        assert_eq!(
            movement_references(&product, Some(&from), Some(&to)),
            vec![
                (CatalogKind::Product, "P1"),
                (CatalogKind::Location, "L1"),
                (CatalogKind::Location, "L2"),
            ]
        );
        assert_eq!(
            movement_references(&product, None, Some(&to)),
            vec![(CatalogKind::Product, "P1"), (CatalogKind::Location, "L2")]
        );
    }
}
