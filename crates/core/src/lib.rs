//! `stockbook-core`: shared building blocks for the inventory tracker.
//!
//! This crate contains **pure** primitives only: the error taxonomy, the
//! validated identity types and the `Entity` trait. No storage, no IO.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{InventoryError, InventoryResult};
pub use id::{LocationId, MovementId, ProductId};
