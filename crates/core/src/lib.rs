//! `timberyard-core`: foundation building blocks for the catalog.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the entity/value-object markers and the error model shared by
//! the catalog and its stores.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{CatalogError, CatalogResult, StorageError, ValidationError};
pub use id::PlankId;
pub use value_object::ValueObject;
