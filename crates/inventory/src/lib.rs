//! Inventory domain module.
//!
//! This crate contains the business rules for the inventory tracker,
//! implemented purely as deterministic domain logic (no IO, no storage):
//!
//! - [`catalog`]: products and locations (identity registries)
//! - [`movement`]: directional quantity transfers and their validation
//! - [`balance`]: the reduction of the movement ledger into on-hand balances

pub mod balance;
pub mod catalog;
pub mod movement;

pub use balance::{BalanceRow, LedgerSnapshot, all_balances, compute_balances, negative_balances};
pub use catalog::{CatalogEntry, CatalogKind, Location, Product, validate_name};
pub use movement::{Movement, MovementDraft, ValidMovement};
