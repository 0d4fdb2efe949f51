use std::collections::HashMap;

use chrono::{SubsecRound, Utc};
use tracing::instrument;

use stockbook_core::{InventoryError, InventoryResult, LocationId, MovementId, ProductId};
use stockbook_inventory::{Movement, MovementDraft};

use crate::config::ReferencePolicy;
use crate::store::SharedStore;

/// A movement joined with the display names of what it references.
///
/// A name is `None` when the endpoint is absent or the referenced entry is
/// not (or no longer) in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementView {
    pub movement: Movement,
    pub product_name: Option<String>,
    pub from_location_name: Option<String>,
    pub to_location_name: Option<String>,
}

/// Append/edit/remove access to the product movement ledger.
#[derive(Clone)]
pub struct MovementLedger {
    store: SharedStore,
    policy: ReferencePolicy,
}

impl MovementLedger {
    pub fn new(store: SharedStore, policy: ReferencePolicy) -> Self {
        Self { store, policy }
    }

    /// Validate and append a movement, returning its fresh identity.
    ///
    /// The timestamp is taken here, at microsecond precision, and never
    /// changes afterwards.
    #[instrument(skip(self, draft), fields(product_id = %draft.product_id, qty = draft.qty), err)]
    pub async fn record(&self, draft: &MovementDraft) -> InventoryResult<MovementId> {
        let valid = draft.validate()?;

        let movement = valid.into_movement(MovementId::new(), Utc::now().trunc_subsecs(6));
        self.store.insert_movement(&movement, self.policy).await?;

        tracing::info!(movement_id = %movement.movement_id, "movement recorded");
        Ok(movement.movement_id)
    }

    /// Replace the caller-controlled fields of an existing movement.
    ///
    /// Identity and timestamp are preserved.
    #[instrument(skip(self, draft), fields(movement_id = %movement_id, qty = draft.qty), err)]
    pub async fn edit(
        &self,
        movement_id: MovementId,
        draft: &MovementDraft,
    ) -> InventoryResult<Movement> {
        let valid = draft.validate()?;

        if self.store.update_movement(movement_id, &valid, self.policy).await? == 0 {
            return Err(InventoryError::not_found("movement", movement_id.to_string()));
        }

        tracing::info!("movement edited");
        self.store
            .get_movement(movement_id)
            .await?
            .ok_or_else(|| InventoryError::not_found("movement", movement_id.to_string()))
    }

    /// Delete a movement. Returns `false` when it did not exist.
    #[instrument(skip(self), fields(movement_id = %movement_id), err)]
    pub async fn remove(&self, movement_id: MovementId) -> InventoryResult<bool> {
        let removed = self.store.delete_movement(movement_id).await? > 0;
        if removed {
            tracing::info!("movement removed");
        } else {
            tracing::debug!("remove of unknown movement ignored");
        }
        Ok(removed)
    }

    pub async fn get(&self, movement_id: MovementId) -> InventoryResult<Option<Movement>> {
        self.store.get_movement(movement_id).await
    }

    /// All movements, newest first, with product and location names attached.
    pub async fn list(&self) -> InventoryResult<Vec<MovementView>> {
        let snapshot = self.store.snapshot().await?;

        let product_names: HashMap<&ProductId, &str> = snapshot
            .products
            .iter()
            .map(|p| (&p.product_id, p.name.as_str()))
            .collect();
        let location_names: HashMap<&LocationId, &str> = snapshot
            .locations
            .iter()
            .map(|l| (&l.location_id, l.name.as_str()))
            .collect();
        let location_name = |id: &Option<LocationId>| {
            id.as_ref()
                .and_then(|id| location_names.get(id))
                .map(|name| name.to_string())
        };

        Ok(snapshot
            .movements
            .iter()
            .map(|m| MovementView {
                product_name: product_names.get(&m.product_id).map(|name| name.to_string()),
                from_location_name: location_name(&m.from_location),
                to_location_name: location_name(&m.to_location),
                movement: m.clone(),
            })
            .collect())
    }
}
