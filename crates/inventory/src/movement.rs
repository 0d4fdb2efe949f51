use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{Entity, InventoryError, InventoryResult, LocationId, MovementId, ProductId};

/// One directional quantity transfer of a product.
///
/// A movement with only `to_location` is a receipt into stock, one with only
/// `from_location` is an issue out of stock, and one with both is a transfer
/// between locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub movement_id: MovementId,
    /// Set once at creation; edits never change it.
    pub timestamp: DateTime<Utc>,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub product_id: ProductId,
    pub qty: i64,
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.movement_id
    }
}

impl Movement {
    /// Net quantity change this movement causes at `location`.
    ///
    /// A movement from a location to itself nets to zero.
    pub fn delta_at(&self, location: &LocationId) -> i64 {
        let mut delta = 0;
        if self.to_location.as_ref() == Some(location) {
            delta += self.qty;
        }
        if self.from_location.as_ref() == Some(location) {
            delta -= self.qty;
        }
        delta
    }

    /// Replace every caller-controlled field, keeping identity and timestamp.
    pub fn apply_edit(&mut self, edit: ValidMovement) {
        self.from_location = edit.from_location;
        self.to_location = edit.to_location;
        self.product_id = edit.product_id;
        self.qty = edit.qty;
    }
}

/// Caller-supplied movement fields, not yet validated.
///
/// Empty or whitespace-only endpoints mean "no location".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementDraft {
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub product_id: String,
    pub qty: i64,
}

impl MovementDraft {
    pub fn new(product_id: impl Into<String>, qty: i64) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
            ..Self::default()
        }
    }

    pub fn with_from(mut self, location: impl Into<String>) -> Self {
        self.from_location = Some(location.into());
        self
    }

    pub fn with_to(mut self, location: impl Into<String>) -> Self {
        self.to_location = Some(location.into());
        self
    }

    /// Check the ledger invariants and produce typed fields.
    ///
    /// - `qty` must be strictly positive
    /// - at least one endpoint must be present (both denotes a transfer)
    /// - `product_id` is required
    pub fn validate(&self) -> InventoryResult<ValidMovement> {
        if self.qty <= 0 {
            return Err(InventoryError::invalid(format!(
                "qty must be a positive integer (got {})",
                self.qty
            )));
        }

        let from_location = endpoint(self.from_location.as_deref())?;
        let to_location = endpoint(self.to_location.as_deref())?;
        if from_location.is_none() && to_location.is_none() {
            return Err(InventoryError::invalid(
                "either from_location or to_location must be specified",
            ));
        }

        let product_id = ProductId::parse(&self.product_id)?;

        Ok(ValidMovement {
            from_location,
            to_location,
            product_id,
            qty: self.qty,
        })
    }
}

fn endpoint(raw: Option<&str>) -> InventoryResult<Option<LocationId>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => LocationId::parse(id).map(Some),
    }
}

/// Movement fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMovement {
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub product_id: ProductId,
    pub qty: i64,
}

impl ValidMovement {
    /// Stamp identity and creation time onto validated fields.
    pub fn into_movement(self, movement_id: MovementId, timestamp: DateTime<Utc>) -> Movement {
        Movement {
            movement_id,
            timestamp,
            from_location: self.from_location,
            to_location: self.to_location,
            product_id: self.product_id,
            qty: self.qty,
        }
    }

    /// Endpoints that are present, in from/to order.
    pub fn endpoints(&self) -> impl Iterator<Item = &LocationId> {
        self.from_location.iter().chain(self.to_location.iter())
    }
}
