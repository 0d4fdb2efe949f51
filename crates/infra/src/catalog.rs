use std::marker::PhantomData;

use tracing::instrument;

use stockbook_core::{InventoryError, InventoryResult};
use stockbook_inventory::{CatalogEntry, validate_name};

use crate::config::ReferencePolicy;
use crate::store::{CatalogRecord, SharedStore};

/// Registry of named catalog entries (products or locations).
///
/// Identifiers are caller-chosen and immutable; only the display name can
/// change after registration.
pub struct Catalog<E: CatalogEntry> {
    store: SharedStore,
    policy: ReferencePolicy,
    _entry: PhantomData<fn() -> E>,
}

impl<E: CatalogEntry> Clone for Catalog<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            policy: self.policy,
            _entry: PhantomData,
        }
    }
}

impl<E: CatalogEntry> Catalog<E> {
    pub fn new(store: SharedStore, policy: ReferencePolicy) -> Self {
        Self {
            store,
            policy,
            _entry: PhantomData,
        }
    }

    /// Add a new entry.
    ///
    /// Fails with `InvalidArgument` when the id or name is blank and with
    /// `DuplicateIdentity` when the id is already registered.
    #[instrument(skip(self), fields(kind = %E::KIND), err)]
    pub async fn register(&self, id: &str, name: &str) -> InventoryResult<E> {
        let id = E::parse_id(id)?;
        let name = validate_name(E::KIND, name)?;

        self.store
            .insert_entry(E::KIND, CatalogRecord::new(id.as_ref(), name.as_str()))
            .await?;

        tracing::info!(id = id.as_ref(), "registered {}", E::KIND);
        Ok(E::from_parts(id, name))
    }

    /// Change the display name of an existing entry.
    #[instrument(skip(self), fields(kind = %E::KIND), err)]
    pub async fn rename(&self, id: &str, new_name: &str) -> InventoryResult<E> {
        let id = E::parse_id(id)?;
        let name = validate_name(E::KIND, new_name)?;

        let touched = self.store.rename_entry(E::KIND, id.as_ref(), &name).await?;
        if touched == 0 {
            return Err(InventoryError::not_found(E::KIND.as_str(), id.as_ref()));
        }

        tracing::info!(id = id.as_ref(), "renamed {}", E::KIND);
        Ok(E::from_parts(id, name))
    }

    /// Delete an entry. Returns `false` when nothing was registered under `id`.
    ///
    /// Under [`ReferencePolicy::Enforced`] an entry still named by a movement
    /// cannot be removed.
    #[instrument(skip(self), fields(kind = %E::KIND), err)]
    pub async fn remove(&self, id: &str) -> InventoryResult<bool> {
        let id = E::parse_id(id)?;

        let removed = self
            .store
            .delete_entry(E::KIND, id.as_ref(), self.policy)
            .await?
            > 0;
        if removed {
            tracing::info!(id = id.as_ref(), "removed {}", E::KIND);
        } else {
            tracing::debug!(id = id.as_ref(), "remove of unknown {} ignored", E::KIND);
        }
        Ok(removed)
    }

    pub async fn get(&self, id: &str) -> InventoryResult<Option<E>> {
        let id = E::parse_id(id)?;
        self.store
            .get_entry(E::KIND, id.as_ref())
            .await?
            .map(CatalogRecord::into_entry)
            .transpose()
    }

    /// All entries, ordered by identifier ascending.
    pub async fn list(&self) -> InventoryResult<Vec<E>> {
        self.store
            .list_entries(E::KIND)
            .await?
            .into_iter()
            .map(CatalogRecord::into_entry)
            .collect()
    }
}
