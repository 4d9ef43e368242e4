use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use timberyard_catalog::parse_price_list;
use timberyard_infra::{CatalogRepository, InMemoryCatalogStore, PostgresCatalogStore, StoreConfig};
use timberyard_seed::{ImportReport, import};

const DEFAULT_PRICE_LIST: &str = "price_list.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    timberyard_observability::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICE_LIST));

    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading price list {}", path.display()))?;
    let list = parse_price_list(&text);
    info!(path = %path.display(), items = list.items.len(), "price list parsed");

    let config = StoreConfig::from_env()?;
    let report: ImportReport = if config.database_url.is_some() {
        let store = PostgresCatalogStore::connect(&config).await?;
        store.ensure_schema().await?;
        import(&CatalogRepository::new(store), list).await?
    } else {
        warn!("DATABASE_URL not set; importing into an in-memory catalog (dry run)");
        import(&CatalogRepository::new(InMemoryCatalogStore::new()), list).await?
    };

    info!(
        created = report.created,
        duplicates = report.duplicates,
        invalid = report.invalid,
        unparsed_lines = report.unparsed_lines,
        "import finished"
    );
    Ok(())
}
