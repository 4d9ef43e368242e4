use std::sync::Arc;

use async_trait::async_trait;

use timberyard_catalog::{NewWoodPlank, WoodPlank, WoodPlankPatch};
use timberyard_core::{CatalogResult, PlankId};

use super::query::{PlankPage, PlankQuery};

/// Persistence boundary for the wood-plank catalog.
///
/// Implementations own identity and timestamps: `insert` assigns the id and
/// sets `created_at = updated_at = now`, and every mutation refreshes
/// `updated_at` to a value strictly later than the previous one.
///
/// ## Atomicity
///
/// Each method is a single atomic step against the backing storage:
///
/// - SKU uniqueness is checked and enforced in the same step as the write
///   (`DuplicateSku` otherwise).
/// - `adjust_stock` checks `current + delta >= 0` and writes in one step, so
///   concurrent adjustments on the same item behave like some serial order and
///   never drive the quantity below zero.
/// - `update` writes only the fields present in the patch, so it never
///   clobbers a concurrent stock adjustment.
///
/// Callers (the repository) validate and normalise input before reaching the
/// store; stores still reject constraint violations they can detect.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a new item.
    async fn insert(&self, new: NewWoodPlank) -> CatalogResult<WoodPlank>;

    /// Fetch an item by id. `Ok(None)` when absent.
    async fn get(&self, id: PlankId) -> CatalogResult<Option<WoodPlank>>;

    /// Fetch an item by exact SKU. `Ok(None)` when absent.
    async fn get_by_sku(&self, sku: &str) -> CatalogResult<Option<WoodPlank>>;

    /// Filter, order and page the catalog.
    async fn query(&self, query: &PlankQuery) -> CatalogResult<PlankPage>;

    /// Apply the present fields of `patch` and refresh `updated_at`.
    ///
    /// `NotFound` if the item does not exist.
    async fn update(&self, id: PlankId, patch: &WoodPlankPatch) -> CatalogResult<WoodPlank>;

    /// Remove an item. `NotFound` if it does not exist.
    async fn delete(&self, id: PlankId) -> CatalogResult<()>;

    /// Add `delta` (which may be negative) to the stock quantity.
    ///
    /// `InsufficientStock` when the result would be negative, leaving the item
    /// unchanged.
    async fn adjust_stock(&self, id: PlankId, delta: i32) -> CatalogResult<WoodPlank>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert(&self, new: NewWoodPlank) -> CatalogResult<WoodPlank> {
        (**self).insert(new).await
    }

    async fn get(&self, id: PlankId) -> CatalogResult<Option<WoodPlank>> {
        (**self).get(id).await
    }

    async fn get_by_sku(&self, sku: &str) -> CatalogResult<Option<WoodPlank>> {
        (**self).get_by_sku(sku).await
    }

    async fn query(&self, query: &PlankQuery) -> CatalogResult<PlankPage> {
        (**self).query(query).await
    }

    async fn update(&self, id: PlankId, patch: &WoodPlankPatch) -> CatalogResult<WoodPlank> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: PlankId) -> CatalogResult<()> {
        (**self).delete(id).await
    }

    async fn adjust_stock(&self, id: PlankId, delta: i32) -> CatalogResult<WoodPlank> {
        (**self).adjust_stock(id, delta).await
    }
}
