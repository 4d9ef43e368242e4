//! Stock adjustments.
//!
//! The check `current + delta >= 0` and the write happen in one atomic store
//! step, so concurrent adjustments to the same item never lose updates and
//! never leave a negative quantity.

use tracing::{info, instrument, warn};

use timberyard_catalog::WoodPlank;
use timberyard_core::{CatalogError, CatalogResult, PlankId};

use crate::store::CatalogStore;

#[derive(Debug, Clone)]
pub struct StockService<S> {
    store: S,
}

impl<S: CatalogStore> StockService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Add `delta` (negative to withdraw) to an item's stock.
    ///
    /// Fails with `InsufficientStock` if the result would be negative; the item
    /// is then left exactly as it was. A zero delta only refreshes `updated_at`.
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn adjust_stock(&self, id: PlankId, delta: i32) -> CatalogResult<WoodPlank> {
        match self.store.adjust_stock(id, delta).await {
            Ok(plank) => {
                info!(
                    id = %plank.id,
                    delta,
                    stock_quantity = plank.stock_quantity,
                    "stock adjusted"
                );
                Ok(plank)
            }
            Err(err @ CatalogError::InsufficientStock { .. }) => {
                warn!(error = %err, "stock adjustment refused");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Book `quantity` (> 0) units into stock.
    pub async fn receive(&self, id: PlankId, quantity: i32) -> CatalogResult<WoodPlank> {
        ensure_positive(quantity)?;
        self.adjust_stock(id, quantity).await
    }

    /// Take `quantity` (> 0) units out of stock.
    pub async fn withdraw(&self, id: PlankId, quantity: i32) -> CatalogResult<WoodPlank> {
        ensure_positive(quantity)?;
        self.adjust_stock(id, -quantity).await
    }
}

fn ensure_positive(quantity: i32) -> CatalogResult<()> {
    if quantity <= 0 {
        return Err(CatalogError::validation(
            "quantity",
            format!("must be greater than 0 (got {quantity})"),
        ));
    }
    Ok(())
}
