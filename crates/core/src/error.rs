//! Inventory error model.

use thiserror::Error;

/// Result type used across the inventory crates.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Classified failure of a catalog, ledger or balance operation.
///
/// Validation failures (`InvalidArgument`) are always detected before any
/// storage mutation is attempted. `StorageFailure` covers everything the
/// backend reports that is not otherwise classified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Empty required field, non-positive quantity, missing endpoints, bad config.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Registration of an identifier that already exists.
    #[error("{kind} '{id}' already exists")]
    DuplicateIdentity { kind: &'static str, id: String },

    /// Rename/edit targeting an identifier that does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// The storage backend failed for reasons outside input validation.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl InventoryError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn duplicate(kind: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            kind,
            id: id.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageFailure(msg.into())
    }
}
