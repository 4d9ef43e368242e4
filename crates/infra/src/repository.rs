//! Catalog repository: validated CRUD and listing over a [`CatalogStore`].

use tracing::{info, instrument};

use timberyard_catalog::{NewWoodPlank, WoodPlank, WoodPlankPatch, validate, validate_patch, validate_plank};
use timberyard_core::{CatalogError, CatalogResult, PlankId};

use crate::store::{CatalogStore, Pagination, PlankPage, PlankQuery};

/// Entry point for catalog reads and writes.
///
/// Validates and normalises input before it reaches the store, and turns
/// absent rows into `NotFound`. Uniqueness and atomicity are the store's job.
#[derive(Debug, Clone)]
pub struct CatalogRepository<S> {
    store: S,
}

impl<S: CatalogStore> CatalogRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate, normalise and persist a new item.
    #[instrument(skip(self, new), fields(sku = %new.sku), err)]
    pub async fn create(&self, new: NewWoodPlank) -> CatalogResult<WoodPlank> {
        validate(&new)?;
        let plank = self.store.insert(new.normalized()).await?;
        info!(id = %plank.id, sku = %plank.sku, "catalog item created");
        Ok(plank)
    }

    pub async fn get_by_id(&self, id: PlankId) -> CatalogResult<WoodPlank> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(id))
    }

    pub async fn get_by_sku(&self, sku: &str) -> CatalogResult<WoodPlank> {
        let sku = sku.trim();
        self.store
            .get_by_sku(sku)
            .await?
            .ok_or_else(|| CatalogError::sku_not_found(sku))
    }

    /// One page of the filtered, ordered catalog.
    pub async fn list(&self, query: &PlankQuery) -> CatalogResult<PlankPage> {
        query.filter.validate()?;
        self.store.query(query).await
    }

    /// Walk every page of `query`, `page_size` items at a time, starting at the
    /// query's own offset.
    pub fn pages(&self, query: PlankQuery, page_size: u32) -> PlankPages<'_, S> {
        PlankPages::new(&self.store, query, page_size)
    }

    /// Apply a partial update.
    ///
    /// The merged item is validated as a whole; only the supplied fields are
    /// written, so concurrent stock adjustments are never overwritten.
    #[instrument(skip(self, patch), fields(id = %id), err)]
    pub async fn update(&self, id: PlankId, patch: WoodPlankPatch) -> CatalogResult<WoodPlank> {
        validate_patch(&patch)?;
        let patch = patch.normalized();

        let current = self.get_by_id(id).await?;
        let mut merged = current.clone();
        merged.apply_patch(&patch);
        validate_plank(&merged)?;

        if merged.sku != current.sku {
            if let Some(owner) = self.store.get_by_sku(&merged.sku).await? {
                if owner.id != id {
                    return Err(CatalogError::duplicate_sku(merged.sku));
                }
            }
        }

        let updated = self.store.update(id, &patch).await?;
        info!(id = %updated.id, sku = %updated.sku, "catalog item updated");
        Ok(updated)
    }

    /// Remove an item for good. Its SKU becomes available again.
    #[instrument(skip(self), fields(id = %id), err)]
    pub async fn delete(&self, id: PlankId) -> CatalogResult<()> {
        self.store.delete(id).await?;
        info!(id = %id, "catalog item deleted");
        Ok(())
    }
}

/// Lazy, finite, restartable walk over the pages of a listing.
///
/// Each call to [`PlankPages::next_page`] fetches one page from the store. The
/// walk ends after the first page that reports no more items (or comes back
/// empty). Items created or deleted mid-walk can shift offsets; the walk is
/// consistent only against a quiescent catalog.
pub struct PlankPages<'a, S> {
    store: &'a S,
    query: PlankQuery,
    page_size: u32,
    next_offset: u32,
    exhausted: bool,
}

impl<'a, S: CatalogStore> PlankPages<'a, S> {
    fn new(store: &'a S, query: PlankQuery, page_size: u32) -> Self {
        let page_size = Pagination::new(Some(page_size.max(1)), None).limit;
        let next_offset = query.pagination.offset;
        Self {
            store,
            query,
            page_size,
            next_offset,
            exhausted: false,
        }
    }

    pub async fn next_page(&mut self) -> CatalogResult<Option<PlankPage>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut query = self.query.clone();
        query.pagination = Pagination {
            limit: self.page_size,
            offset: self.next_offset,
        };
        query.filter.validate()?;

        let page = self.store.query(&query).await?;
        if page.items.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        self.exhausted = !page.has_more;
        self.next_offset = self.next_offset.saturating_add(self.page_size);
        Ok(Some(page))
    }

    /// Start again from the first page.
    pub fn restart(&mut self) {
        self.next_offset = self.query.pagination.offset;
        self.exhausted = false;
    }

    /// Drain the remaining pages into a single list.
    pub async fn collect_items(&mut self) -> CatalogResult<Vec<WoodPlank>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page.items);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryCatalogStore, InclusiveRange, PlankFilter, SortDirection, SortKey};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use timberyard_catalog::{FinishType, ProductCategory, ProductGrade, WoodType};

    fn oak_board(sku: &str) -> NewWoodPlank {
        NewWoodPlank {
            sku: sku.to_string(),
            name: "Oak board".to_string(),
            category: ProductCategory::ShortTimber,
            wood_type: WoodType::Oak,
            grade: ProductGrade::AGrade,
            finish: FinishType::PlanedAllRound,
            thickness_mm: 22,
            width_mm: 144,
            length_mm: 1800,
            price: dec!(120.5),
            stock_quantity: 10,
            unit_of_measure: "EA".to_string(),
            description: Some("Kiln dried European oak".to_string()),
            image_url: None,
        }
    }

    fn repo() -> CatalogRepository<Arc<InMemoryCatalogStore>> {
        CatalogRepository::new(Arc::new(InMemoryCatalogStore::new()))
    }

    async fn seed(repo: &CatalogRepository<Arc<InMemoryCatalogStore>>) {
        let rows = [
            ("PAL-S-1200x1000x150", ProductCategory::Pallet, WoodType::Pine, 1200, dec!(95), 4),
            ("LT-A-23x100x2500", ProductCategory::LongTimber, WoodType::Baltic, 2500, dec!(40), 0),
            ("LT-A-38x114x4800", ProductCategory::LongTimber, WoodType::Baltic, 4800, dec!(155), 12),
            ("ST-B-22x144x900", ProductCategory::ShortTimber, WoodType::Pine, 900, dec!(18.5), 30),
            ("PLY-S-18x1220x2440", ProductCategory::Plywood, WoodType::Mixed, 2440, dec!(640), 2),
        ];
        for (sku, category, wood_type, length_mm, price, stock) in rows {
            repo.create(NewWoodPlank {
                sku: sku.to_string(),
                name: format!("{sku} board"),
                category,
                wood_type,
                length_mm,
                price,
                stock_quantity: stock,
                description: None,
                ..oak_board(sku)
            })
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn create_then_get_by_sku_round_trips() {
        let repo = repo();
        let input = oak_board("OAK-001");
        let created = repo.create(input.clone()).await.unwrap();
        let fetched = repo.get_by_sku("OAK-001").await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.sku, input.sku);
        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.category, input.category);
        assert_eq!(fetched.dimensions(), input.dimensions());
        assert_eq!(fetched.price, input.price);
        assert_eq!(fetched.price.to_string(), "120.50");
        assert_eq!(fetched.stock_quantity, input.stock_quantity);
        assert_eq!(fetched.description, input.description);
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn create_trims_the_sku() {
        let repo = repo();
        let created = repo.create(oak_board("  OAK-001 ")).await.unwrap();
        assert_eq!(created.sku, "OAK-001");
        assert_eq!(repo.get_by_sku(" OAK-001").await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn duplicate_sku_leaves_the_first_item_unchanged() {
        let repo = repo();
        let first = repo.create(oak_board("OAK-001")).await.unwrap();

        let mut second = oak_board("OAK-001");
        second.price = dec!(1);
        let err = repo.create(second).await.unwrap_err();

        assert_eq!(err, CatalogError::duplicate_sku("OAK-001"));
        assert_eq!(repo.get_by_sku("OAK-001").await.unwrap(), first);
    }

    #[tokio::test]
    async fn zero_thickness_is_rejected_and_nothing_is_persisted() {
        let repo = repo();
        let mut bad = oak_board("OAK-001");
        bad.thickness_mm = 0;

        match repo.create(bad).await.unwrap_err() {
            CatalogError::Validation(e) => assert_eq!(e.field, "thickness_mm"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(repo.store().is_empty().unwrap());
        assert_eq!(
            repo.get_by_sku("OAK-001").await.unwrap_err(),
            CatalogError::sku_not_found("OAK-001")
        );
    }

    #[tokio::test]
    async fn sub_cent_prices_are_rejected() {
        let repo = repo();
        let mut bad = oak_board("OAK-001");
        bad.price = dec!(9.999);
        assert!(matches!(
            repo.create(bad).await,
            Err(CatalogError::Validation(e)) if e.field == "price"
        ));
    }

    #[tokio::test]
    async fn missing_items_are_not_found() {
        let repo = repo();
        let id = PlankId::new();
        assert_eq!(repo.get_by_id(id).await.unwrap_err(), CatalogError::not_found(id));
        assert_eq!(
            repo.update(id, WoodPlankPatch::default()).await.unwrap_err(),
            CatalogError::not_found(id)
        );
        assert_eq!(repo.delete(id).await.unwrap_err(), CatalogError::not_found(id));
    }

    #[tokio::test]
    async fn update_price_is_visible_with_a_later_timestamp() {
        let repo = repo();
        let created = repo.create(oak_board("OAK-001")).await.unwrap();

        let patch = WoodPlankPatch {
            price: Some(dec!(150.00)),
            ..Default::default()
        };
        repo.update(created.id, patch).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap();

        assert_eq!(fetched.price, dec!(150.00));
        assert!(fetched.updated_at > created.updated_at);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.stock_quantity, created.stock_quantity);
    }

    #[tokio::test]
    async fn empty_patch_only_touches() {
        let repo = repo();
        let created = repo.create(oak_board("OAK-001")).await.unwrap();
        let updated = repo.update(created.id, WoodPlankPatch::default()).await.unwrap();

        assert!(updated.updated_at > created.updated_at);
        assert_eq!(
            WoodPlank {
                updated_at: created.updated_at,
                ..updated
            },
            created
        );
    }

    #[tokio::test]
    async fn update_validates_and_guards_sku() {
        let repo = repo();
        let created = repo.create(oak_board("OAK-001")).await.unwrap();
        repo.create(oak_board("OAK-002")).await.unwrap();

        let bad = WoodPlankPatch {
            width_mm: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(created.id, bad).await,
            Err(CatalogError::Validation(e)) if e.field == "width_mm"
        ));

        let clash = WoodPlankPatch {
            sku: Some("OAK-002".to_string()),
            ..Default::default()
        };
        assert_eq!(
            repo.update(created.id, clash).await.unwrap_err(),
            CatalogError::duplicate_sku("OAK-002")
        );
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_can_clear_optional_text() {
        let repo = repo();
        let created = repo.create(oak_board("OAK-001")).await.unwrap();
        let patch = WoodPlankPatch {
            description: Some(None),
            image_url: Some(Some("https://cdn.example.com/oak.jpg".to_string())),
            ..Default::default()
        };
        let updated = repo.update(created.id, patch).await.unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.image_url.as_deref(), Some("https://cdn.example.com/oak.jpg"));
    }

    #[tokio::test]
    async fn delete_is_hard_and_frees_the_sku() {
        let repo = repo();
        let created = repo.create(oak_board("OAK-001")).await.unwrap();
        repo.delete(created.id).await.unwrap();

        assert_eq!(
            repo.get_by_id(created.id).await.unwrap_err(),
            CatalogError::not_found(created.id)
        );
        let again = repo.create(oak_board("OAK-001")).await.unwrap();
        assert_ne!(again.id, created.id);
    }

    #[tokio::test]
    async fn default_listing_is_sku_ordered() {
        let repo = repo();
        seed(&repo).await;
        let page = repo.list(&PlankQuery::default()).await.unwrap();

        let skus: Vec<_> = page.items.iter().map(|p| p.sku.as_str()).collect();
        let mut sorted = skus.clone();
        sorted.sort();
        assert_eq!(skus, sorted);
        assert_eq!(page.total, 5);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn category_filters_partition_the_catalog() {
        let repo = repo();
        seed(&repo).await;

        let all = repo.list(&PlankQuery::default()).await.unwrap();
        let mut union = Vec::new();
        for &category in ProductCategory::ALL {
            let page = repo
                .list(&PlankQuery::new(PlankFilter {
                    category: Some(category),
                    ..Default::default()
                }))
                .await
                .unwrap();
            assert!(page.items.iter().all(|p| p.category == category));
            union.extend(page.items.into_iter().map(|p| p.id));
        }
        let mut expected: Vec<_> = all.items.iter().map(|p| p.id).collect();
        union.sort();
        expected.sort();
        assert_eq!(union, expected);
    }

    #[tokio::test]
    async fn combined_filters_and_sorting() {
        let repo = repo();
        seed(&repo).await;

        let query = PlankQuery::new(PlankFilter {
            wood_type: Some(WoodType::Baltic),
            length_mm: InclusiveRange::at_least(2000),
            in_stock: true,
            ..Default::default()
        });
        let page = repo.list(&query).await.unwrap();
        let skus: Vec<_> = page.items.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["LT-A-38x114x4800"]);

        let by_price = PlankQuery::default().sorted_by(SortKey::Price, SortDirection::Desc);
        let page = repo.list(&by_price).await.unwrap();
        let prices: Vec<_> = page.items.iter().map(|p| p.price).collect();
        assert_eq!(prices.first(), Some(&dec!(640)));
        assert_eq!(prices.last(), Some(&dec!(18.5)));
    }

    #[tokio::test]
    async fn search_matches_sku_and_name() {
        let repo = repo();
        seed(&repo).await;
        let page = repo
            .list(&PlankQuery::new(PlankFilter {
                search: Some("lt-a".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn inverted_range_is_a_validation_error() {
        let repo = repo();
        let query = PlankQuery::new(PlankFilter {
            price: InclusiveRange::between(dec!(100), dec!(10)),
            ..Default::default()
        });
        assert!(matches!(
            repo.list(&query).await,
            Err(CatalogError::Validation(e)) if e.field == "price"
        ));
    }

    #[tokio::test]
    async fn pagination_reports_totals() {
        let repo = repo();
        seed(&repo).await;
        let page = repo
            .list(&PlankQuery::default().page(Pagination::new(Some(2), Some(2))))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn pages_walk_everything_once_and_restart() {
        let repo = repo();
        seed(&repo).await;
        let all = repo.list(&PlankQuery::default()).await.unwrap().items;

        let mut pages = repo.pages(PlankQuery::default(), 2);
        let mut sizes = Vec::new();
        let mut seen = Vec::new();
        while let Some(page) = pages.next_page().await.unwrap() {
            sizes.push(page.items.len());
            seen.extend(page.items);
        }
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(seen, all);
        assert_eq!(pages.next_page().await.unwrap(), None);

        pages.restart();
        assert_eq!(pages.collect_items().await.unwrap(), all);
    }

    #[tokio::test]
    async fn pages_over_an_empty_catalog_yield_nothing() {
        let repo = repo();
        let mut pages = repo.pages(PlankQuery::default(), 10);
        assert_eq!(pages.next_page().await.unwrap(), None);
    }
}
