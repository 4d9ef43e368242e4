use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use timberyard_catalog::validation::check_stock_quantity;
use timberyard_catalog::{NewWoodPlank, WoodPlank, WoodPlankPatch, validate, validate_plank};
use timberyard_core::{CatalogError, CatalogResult, PlankId, StorageError};

use super::query::{PlankPage, PlankQuery};
use super::r#trait::CatalogStore;

#[derive(Debug, Default)]
struct Tables {
    planks: HashMap<PlankId, WoodPlank>,
    by_sku: HashMap<String, PlankId>,
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Every mutation runs its checks and its write inside
/// one write-lock critical section, which serialises operations on the same
/// item. Not optimized for performance: queries scan the whole table.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items. Fails like every other read once the lock is
    /// poisoned.
    pub fn len(&self) -> CatalogResult<usize> {
        Ok(self.read("len")?.planks.len())
    }

    pub fn is_empty(&self) -> CatalogResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self, operation: &'static str) -> CatalogResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StorageError::backend(operation, "lock poisoned").into())
    }

    fn write(&self, operation: &'static str) -> CatalogResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StorageError::backend(operation, "lock poisoned").into())
    }

    fn insert_now(&self, new: NewWoodPlank) -> CatalogResult<WoodPlank> {
        validate(&new)?;

        let mut tables = self.write("insert")?;
        if tables.by_sku.contains_key(&new.sku) {
            return Err(CatalogError::duplicate_sku(new.sku));
        }

        let plank = WoodPlank::from_new(PlankId::new(), new, Utc::now());
        tables.by_sku.insert(plank.sku.clone(), plank.id);
        tables.planks.insert(plank.id, plank.clone());
        Ok(plank)
    }

    fn get_now(&self, id: PlankId) -> CatalogResult<Option<WoodPlank>> {
        Ok(self.read("get")?.planks.get(&id).cloned())
    }

    fn get_by_sku_now(&self, sku: &str) -> CatalogResult<Option<WoodPlank>> {
        let tables = self.read("get_by_sku")?;
        Ok(tables
            .by_sku
            .get(sku)
            .and_then(|id| tables.planks.get(id))
            .cloned())
    }

    fn query_now(&self, query: &PlankQuery) -> CatalogResult<PlankPage> {
        query.filter.validate()?;
        let pagination = query.pagination.clamped();

        let tables = self.read("query")?;
        let mut matching: Vec<&WoodPlank> = tables
            .planks
            .values()
            .filter(|p| query.filter.matches(p))
            .collect();
        matching.sort_by(|a, b| query.sort.compare(a, b));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();

        Ok(PlankPage::new(items, total, pagination))
    }

    fn update_now(&self, id: PlankId, patch: &WoodPlankPatch) -> CatalogResult<WoodPlank> {
        let mut tables = self.write("update")?;
        let Some(current) = tables.planks.get(&id) else {
            return Err(CatalogError::not_found(id));
        };

        let mut merged = current.clone();
        merged.apply_patch(patch);
        validate_plank(&merged)?;

        let old_sku = current.sku.clone();
        if merged.sku != old_sku {
            if let Some(owner) = tables.by_sku.get(&merged.sku) {
                if *owner != id {
                    return Err(CatalogError::duplicate_sku(merged.sku));
                }
            }
            tables.by_sku.remove(&old_sku);
            tables.by_sku.insert(merged.sku.clone(), id);
        }

        merged.touch(Utc::now());
        tables.planks.insert(id, merged.clone());
        Ok(merged)
    }

    fn delete_now(&self, id: PlankId) -> CatalogResult<()> {
        let mut tables = self.write("delete")?;
        let removed = tables
            .planks
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found(id))?;
        tables.by_sku.remove(&removed.sku);
        Ok(())
    }

    fn adjust_stock_now(&self, id: PlankId, delta: i32) -> CatalogResult<WoodPlank> {
        let mut tables = self.write("adjust_stock")?;
        let plank = tables
            .planks
            .get_mut(&id)
            .ok_or_else(|| CatalogError::not_found(id))?;

        let available = i64::from(plank.stock_quantity);
        let next = available + i64::from(delta);
        if next < 0 {
            return Err(CatalogError::InsufficientStock {
                id: id.to_string(),
                requested: -i64::from(delta),
                available,
            });
        }

        plank.stock_quantity = check_stock_quantity(next)?;
        plank.touch(Utc::now());
        Ok(plank.clone())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, new: NewWoodPlank) -> CatalogResult<WoodPlank> {
        self.insert_now(new)
    }

    async fn get(&self, id: PlankId) -> CatalogResult<Option<WoodPlank>> {
        self.get_now(id)
    }

    async fn get_by_sku(&self, sku: &str) -> CatalogResult<Option<WoodPlank>> {
        self.get_by_sku_now(sku)
    }

    async fn query(&self, query: &PlankQuery) -> CatalogResult<PlankPage> {
        self.query_now(query)
    }

    async fn update(&self, id: PlankId, patch: &WoodPlankPatch) -> CatalogResult<WoodPlank> {
        self.update_now(id, patch)
    }

    async fn delete(&self, id: PlankId) -> CatalogResult<()> {
        self.delete_now(id)
    }

    async fn adjust_stock(&self, id: PlankId, delta: i32) -> CatalogResult<WoodPlank> {
        self.adjust_stock_now(id, delta)
    }
}
