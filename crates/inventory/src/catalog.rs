use serde::{Deserialize, Serialize};

use stockbook_core::{Entity, InventoryError, InventoryResult, LocationId, ProductId};

/// Which identity registry a catalog entry belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Product,
    Location,
}

impl CatalogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogKind::Product => "product",
            CatalogKind::Location => "location",
        }
    }
}

impl core::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named entry in one of the catalog registries.
///
/// Products and locations share the same lifecycle (register, rename,
/// remove, list), so the catalog component is generic over this trait.
pub trait CatalogEntry:
    Entity<Id: AsRef<str> + Send + Sync> + Clone + core::fmt::Debug + Send + Sync + 'static
{
    const KIND: CatalogKind;

    /// Validate a raw identifier for this registry.
    fn parse_id(raw: &str) -> InventoryResult<Self::Id>;

    /// Build an entry from already-validated parts.
    fn from_parts(id: Self::Id, name: String) -> Self;

    fn name(&self) -> &str;
}

/// Validate a display name: required, surrounding whitespace stripped.
pub fn validate_name(kind: CatalogKind, name: &str) -> InventoryResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::invalid(format!("{kind} name cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// A product that can be stocked and moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
}

impl Product {
    pub fn new(product_id: ProductId, name: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}

impl CatalogEntry for Product {
    const KIND: CatalogKind = CatalogKind::Product;

    fn parse_id(raw: &str) -> InventoryResult<Self::Id> {
        ProductId::parse(raw)
    }

    fn from_parts(id: Self::Id, name: String) -> Self {
        Self::new(id, name)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A place where stock is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: LocationId,
    pub name: String,
}

impl Location {
    pub fn new(location_id: LocationId, name: impl Into<String>) -> Self {
        Self {
            location_id,
            name: name.into(),
        }
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.location_id
    }
}

impl CatalogEntry for Location {
    const KIND: CatalogKind = CatalogKind::Location;

    fn parse_id(raw: &str) -> InventoryResult<Self::Id> {
        LocationId::parse(raw)
    }

    fn from_parts(id: Self::Id, name: String) -> Self {
        Self::new(id, name)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_required() {
        let err = validate_name(CatalogKind::Product, "  ").unwrap_err();
        assert_eq!(
            err,
            InventoryError::InvalidArgument("product name cannot be empty".to_string())
        );
        assert_eq!(
            validate_name(CatalogKind::Location, " Warehouse ").unwrap(),
            "Warehouse"
        );
    }

    #[test]
    fn entries_expose_identity_through_entity() {
        let p = Product::from_parts(Product::parse_id("P1").unwrap(), "Widget".to_string());
        assert_eq!(p.id().as_ref(), "P1");
        assert_eq!(CatalogEntry::name(&p), "Widget");

        let l = Location::from_parts(Location::parse_id("L1").unwrap(), "Store".to_string());
        assert_eq!(l.id().as_ref(), "L1");
        assert_eq!(<Location as CatalogEntry>::KIND, CatalogKind::Location);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CatalogKind::Location).unwrap(),
            "\"location\""
        );
    }
}
