//! Catalog persistence boundary.
//!
//! [`CatalogStore`] is the storage-agnostic interface the repository and the
//! stock service run against. Two backends ship with the crate: an in-memory
//! store for tests/dev and a Postgres store for production.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use query::{
    InclusiveRange, Pagination, PlankFilter, PlankPage, PlankQuery, PlankSort, SortDirection,
    SortKey,
};
pub use r#trait::CatalogStore;
