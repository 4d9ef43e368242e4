//! Price-list import into the catalog.
//!
//! Every parsed item goes through [`CatalogRepository::create`], so imported
//! rows get the same validation and normalisation as any other write. Items
//! whose SKU already exists are counted and left alone, which makes re-running
//! an import harmless.

use anyhow::Context;
use tracing::{info, warn};

use timberyard_catalog::PriceList;
use timberyard_core::CatalogError;
use timberyard_infra::{CatalogRepository, CatalogStore};

/// Outcome of one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub duplicates: usize,
    pub invalid: usize,
    /// Price-list lines the parser could not read.
    pub unparsed_lines: usize,
}

impl ImportReport {
    pub fn attempted(&self) -> usize {
        self.created + self.duplicates + self.invalid
    }
}

/// Create every item of `list`. Storage failures abort the run; duplicate and
/// invalid items are counted and skipped.
pub async fn import<S: CatalogStore>(
    repo: &CatalogRepository<S>,
    list: PriceList,
) -> anyhow::Result<ImportReport> {
    let mut report = ImportReport {
        unparsed_lines: list.skipped.len(),
        ..Default::default()
    };

    for item in list.items {
        let sku = item.sku.clone();
        match repo.create(item).await {
            Ok(_) => report.created += 1,
            Err(CatalogError::DuplicateSku { .. }) => {
                info!(%sku, "already in catalog, skipping");
                report.duplicates += 1;
            }
            Err(CatalogError::Validation(err)) => {
                warn!(%sku, error = %err, "invalid price-list item, skipping");
                report.invalid += 1;
            }
            Err(err) => return Err(err).with_context(|| format!("importing {sku}")),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use timberyard_catalog::parse_price_list;
    use timberyard_infra::{InMemoryCatalogStore, PlankQuery};

    const PRICE_LIST: &str = include_str!("../data/price_list.txt");

    #[tokio::test]
    async fn imports_the_bundled_price_list() {
        let repo = CatalogRepository::new(InMemoryCatalogStore::new());
        let list = parse_price_list(PRICE_LIST);
        let expected = list.items.len();

        let report = import(&repo, list).await.unwrap();
        assert_eq!(report.created, expected);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.invalid, 0);
        assert_eq!(report.unparsed_lines, 0);

        let page = repo.list(&PlankQuery::default()).await.unwrap();
        assert_eq!(page.total as usize, expected);

        let baltic = repo.get_by_sku("LT-A-23x100x2500").await.unwrap();
        assert_eq!(baltic.price, dec!(40.00));
        assert_eq!(baltic.stock_quantity, 10);
    }

    #[tokio::test]
    async fn re_running_only_counts_duplicates() {
        let repo = CatalogRepository::new(InMemoryCatalogStore::new());
        let first = import(&repo, parse_price_list(PRICE_LIST)).await.unwrap();
        let second = import(&repo, parse_price_list(PRICE_LIST)).await.unwrap();

        assert_eq!(second.created, 0);
        assert_eq!(second.duplicates, first.created);
        assert_eq!(second.attempted(), first.attempted());
    }

    #[tokio::test]
    async fn invalid_items_are_counted_not_fatal() {
        let repo = CatalogRepository::new(InMemoryCatalogStore::new());
        let list = parse_price_list("PALLETS\n0 X 1000 X 150 MIXED EA R95\n1200 X 1000 X 150 MIXED EA R95\n");

        let report = import(&repo, list).await.unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.invalid, 1);
    }
}
