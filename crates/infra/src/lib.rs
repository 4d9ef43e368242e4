//! Infrastructure layer: catalog stores, repository, stock service, config.

pub mod config;
pub mod repository;
pub mod stock;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use repository::{CatalogRepository, PlankPages};
pub use stock::StockService;
pub use store::{
    CatalogStore, InMemoryCatalogStore, InclusiveRange, Pagination, PlankFilter, PlankPage,
    PlankQuery, PlankSort, PostgresCatalogStore, SortDirection, SortKey,
};
