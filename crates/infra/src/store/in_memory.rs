use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use stockbook_core::{InventoryError, InventoryResult, MovementId};
use stockbook_inventory::{CatalogKind, LedgerSnapshot, Movement, ValidMovement};

use crate::config::ReferencePolicy;

use super::r#trait::{
    CatalogRecord, InventoryStore, movement_references, still_referenced, typed_snapshot,
    unknown_reference,
};

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<String, String>,
    locations: BTreeMap<String, String>,
    movements: HashMap<MovementId, Movement>,
}

impl State {
    fn registry(&self, kind: CatalogKind) -> &BTreeMap<String, String> {
        match kind {
            CatalogKind::Product => &self.products,
            CatalogKind::Location => &self.locations,
        }
    }

    fn registry_mut(&mut self, kind: CatalogKind) -> &mut BTreeMap<String, String> {
        match kind {
            CatalogKind::Product => &mut self.products,
            CatalogKind::Location => &mut self.locations,
        }
    }

    fn records(&self, kind: CatalogKind) -> Vec<CatalogRecord> {
        self.registry(kind)
            .iter()
            .map(|(id, name)| CatalogRecord::new(id.clone(), name.clone()))
            .collect()
    }

    fn reference_count(&self, kind: CatalogKind, id: &str) -> u64 {
        self.movements
            .values()
            .filter(|m| match kind {
                CatalogKind::Product => m.product_id.as_str() == id,
                CatalogKind::Location => {
                    m.from_location.as_ref().is_some_and(|l| l.as_str() == id)
                        || m.to_location.as_ref().is_some_and(|l| l.as_str() == id)
                }
            })
            .count() as u64
    }

    fn ensure_registered(&self, references: &[(CatalogKind, &str)]) -> InventoryResult<()> {
        match references
            .iter()
            .find(|(kind, id)| !self.registry(*kind).contains_key(*id))
        {
            Some((kind, id)) => Err(unknown_reference(*kind, id)),
            None => Ok(()),
        }
    }

    fn movements_newest_first(&self) -> Vec<Movement> {
        let mut movements: Vec<Movement> = self.movements.values().cloned().collect();
        movements.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.movement_id.cmp(&a.movement_id))
        });
        movements
    }
}

/// In-memory inventory store.
///
/// Intended for tests/dev. Every operation holds the lock for its whole
/// duration, which makes each write atomic and each snapshot consistent.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> InventoryResult<std::sync::RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| InventoryError::storage("lock poisoned"))
    }

    fn write(&self) -> InventoryResult<std::sync::RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| InventoryError::storage("lock poisoned"))
    }
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert_entry(&self, kind: CatalogKind, record: CatalogRecord) -> InventoryResult<()> {
        let mut state = self.write()?;
        let registry = state.registry_mut(kind);
        if registry.contains_key(&record.id) {
            return Err(InventoryError::duplicate(kind.as_str(), record.id));
        }
        registry.insert(record.id, record.name);
        Ok(())
    }

    async fn rename_entry(&self, kind: CatalogKind, id: &str, name: &str) -> InventoryResult<u64> {
        let mut state = self.write()?;
        match state.registry_mut(kind).get_mut(id) {
            Some(existing) => {
                *existing = name.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_entry(
        &self,
        kind: CatalogKind,
        id: &str,
        policy: ReferencePolicy,
    ) -> InventoryResult<u64> {
        let mut state = self.write()?;
        if policy.is_enforced() {
            let references = state.reference_count(kind, id);
            if references > 0 {
                return Err(still_referenced(kind, id, references));
            }
        }
        Ok(state.registry_mut(kind).remove(id).map_or(0, |_| 1))
    }

    async fn get_entry(
        &self,
        kind: CatalogKind,
        id: &str,
    ) -> InventoryResult<Option<CatalogRecord>> {
        let state = self.read()?;
        Ok(state
            .registry(kind)
            .get(id)
            .map(|name| CatalogRecord::new(id, name.clone())))
    }

    async fn list_entries(&self, kind: CatalogKind) -> InventoryResult<Vec<CatalogRecord>> {
        Ok(self.read()?.records(kind))
    }

    async fn insert_movement(
        &self,
        movement: &Movement,
        policy: ReferencePolicy,
    ) -> InventoryResult<()> {
        let mut state = self.write()?;
        if state.movements.contains_key(&movement.movement_id) {
            return Err(InventoryError::duplicate(
                "movement",
                movement.movement_id.to_string(),
            ));
        }
        if policy.is_enforced() {
            state.ensure_registered(&movement_references(
                &movement.product_id,
                movement.from_location.as_ref(),
                movement.to_location.as_ref(),
            ))?;
        }
        state
            .movements
            .insert(movement.movement_id, movement.clone());
        Ok(())
    }

    async fn update_movement(
        &self,
        id: MovementId,
        edit: &ValidMovement,
        policy: ReferencePolicy,
    ) -> InventoryResult<u64> {
        let mut state = self.write()?;
        if !state.movements.contains_key(&id) {
            return Ok(0);
        }
        if policy.is_enforced() {
            state.ensure_registered(&movement_references(
                &edit.product_id,
                edit.from_location.as_ref(),
                edit.to_location.as_ref(),
            ))?;
        }
        match state.movements.get_mut(&id) {
            Some(existing) => {
                existing.apply_edit(edit.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_movement(&self, id: MovementId) -> InventoryResult<u64> {
        let mut state = self.write()?;
        Ok(state.movements.remove(&id).map_or(0, |_| 1))
    }

    async fn get_movement(&self, id: MovementId) -> InventoryResult<Option<Movement>> {
        Ok(self.read()?.movements.get(&id).cloned())
    }

    async fn list_movements(&self) -> InventoryResult<Vec<Movement>> {
        Ok(self.read()?.movements_newest_first())
    }

    async fn snapshot(&self) -> InventoryResult<LedgerSnapshot> {
        let state = self.read()?;
        typed_snapshot(
            state.records(CatalogKind::Product),
            state.records(CatalogKind::Location),
            state.movements_newest_first(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use stockbook_inventory::MovementDraft;

    fn movement(draft: MovementDraft, seconds: i64) -> Movement {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        draft
            .validate()
            .unwrap()
            .into_movement(MovementId::new(), t0 + Duration::seconds(seconds))
    }

    #[tokio::test]
    async fn duplicate_entries_are_rejected() {
        let store = InMemoryInventoryStore::new();
        store
            .insert_entry(CatalogKind::Product, CatalogRecord::new("P1", "Widget"))
            .await
            .unwrap();

        let err = store
            .insert_entry(CatalogKind::Product, CatalogRecord::new("P1", "Other"))
            .await
            .unwrap_err();
        assert_eq!(err, InventoryError::duplicate("product", "P1"));

        // Same id in the other registry is fine.
        store
            .insert_entry(CatalogKind::Location, CatalogRecord::new("P1", "Odd but legal"))
            .await
            .unwrap();

        let products = store.list_entries(CatalogKind::Product).await.unwrap();
        assert_eq!(products, vec![CatalogRecord::new("P1", "Widget")]);
    }

    #[tokio::test]
    async fn writes_report_rows_affected() {
        let store = InMemoryInventoryStore::new();
        assert_eq!(store.rename_entry(CatalogKind::Location, "L1", "X").await.unwrap(), 0);
        let deleted = store
            .delete_entry(CatalogKind::Location, "L1", ReferencePolicy::Advisory)
            .await
            .unwrap();
        assert_eq!(deleted, 0);

        store
            .insert_entry(CatalogKind::Location, CatalogRecord::new("L1", "Warehouse"))
            .await
            .unwrap();
        assert_eq!(store.rename_entry(CatalogKind::Location, "L1", "Depot").await.unwrap(), 1);
        assert_eq!(
            store.get_entry(CatalogKind::Location, "L1").await.unwrap(),
            Some(CatalogRecord::new("L1", "Depot"))
        );
        let deleted = store
            .delete_entry(CatalogKind::Location, "L1", ReferencePolicy::Advisory)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.get_entry(CatalogKind::Location, "L1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn movements_list_newest_first() {
        let store = InMemoryInventoryStore::new();
        let older = movement(MovementDraft::new("P1", 1).with_to("L1"), 0);
        let newer = movement(MovementDraft::new("P1", 2).with_to("L1"), 60);
        store.insert_movement(&older, ReferencePolicy::Advisory).await.unwrap();
        store.insert_movement(&newer, ReferencePolicy::Advisory).await.unwrap();

        let listed = store.list_movements().await.unwrap();
        assert_eq!(listed, vec![newer, older]);
    }

    #[test]
    fn references_count_product_and_both_endpoints() {
        let mut state = State::default();
        for m in [
            movement(MovementDraft::new("P1", 1).with_to("L1"), 0),
            movement(MovementDraft::new("P2", 1).with_from("L1").with_to("L2"), 1),
        ] {
            state.movements.insert(m.movement_id, m);
        }

        assert_eq!(state.reference_count(CatalogKind::Product, "P1"), 1);
        assert_eq!(state.reference_count(CatalogKind::Location, "L1"), 2);
        assert_eq!(state.reference_count(CatalogKind::Location, "L2"), 1);
        assert_eq!(state.reference_count(CatalogKind::Location, "L3"), 0);
    }

    async fn seeded() -> InMemoryInventoryStore {
        let store = InMemoryInventoryStore::new();
        store
            .insert_entry(CatalogKind::Product, CatalogRecord::new("P1", "Widget"))
            .await
            .unwrap();
        store
            .insert_entry(CatalogKind::Location, CatalogRecord::new("L1", "Warehouse"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn enforced_writes_check_references_under_the_same_lock() {
        let store = seeded().await;
        let dangling = movement(MovementDraft::new("P1", 1).with_from("L1").with_to("L9"), 0);

        let err = store
            .insert_movement(&dangling, ReferencePolicy::Enforced)
            .await
            .unwrap_err();
        assert_eq!(err, InventoryError::invalid("unknown location 'L9'"));
        assert!(store.list_movements().await.unwrap().is_empty());

        let valid = movement(MovementDraft::new("P1", 1).with_to("L1"), 0);
        store.insert_movement(&valid, ReferencePolicy::Enforced).await.unwrap();

        let edit = MovementDraft::new("P9", 1).with_to("L1").validate().unwrap();
        let err = store
            .update_movement(valid.movement_id, &edit, ReferencePolicy::Enforced)
            .await
            .unwrap_err();
        assert_eq!(err, InventoryError::invalid("unknown product 'P9'"));
        assert_eq!(store.get_movement(valid.movement_id).await.unwrap(), Some(valid));
    }

    #[tokio::test]
    async fn enforced_delete_refuses_referenced_entries() {
        let store = seeded().await;
        let m = movement(MovementDraft::new("P1", 1).with_to("L1"), 0);
        store.insert_movement(&m, ReferencePolicy::Enforced).await.unwrap();

        let err = store
            .delete_entry(CatalogKind::Location, "L1", ReferencePolicy::Enforced)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidArgument(_)));
        assert!(store.get_entry(CatalogKind::Location, "L1").await.unwrap().is_some());

        store.delete_movement(m.movement_id).await.unwrap();
        assert_eq!(
            store
                .delete_entry(CatalogKind::Location, "L1", ReferencePolicy::Enforced)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn advisory_writes_accept_dangling_references() {
        let store = InMemoryInventoryStore::new();
        let m = movement(MovementDraft::new("NOPE", 1).with_to("NOWHERE"), 0);
        store.insert_movement(&m, ReferencePolicy::Advisory).await.unwrap();
        assert_eq!(store.list_movements().await.unwrap(), vec![m]);
    }
}
