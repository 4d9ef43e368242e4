//! Postgres-backed catalog store.
//!
//! Schema lives in `migrations/0001_wood_planks.sql` and is applied by
//! [`PostgresCatalogStore::ensure_schema`]. Classification columns are native
//! Postgres enums; values are bound as text and cast (`$n::text::wood_type`),
//! and read back as text so decoding goes through the same strict parsers as
//! every other input.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | CatalogError | Scenario |
//! |------------|----------------------|--------------|----------|
//! | Database (unique violation) | `23505` | `DuplicateSku` | SKU already used by another row |
//! | Database (check constraint violation) | `23514` | `Validation` | Row violates a column check |
//! | Database (numeric out of range) | `22003` | `Validation` | Stock or price overflow |
//! | Database (other) | Any other | `Storage(Backend)` | Other database errors |
//! | PoolTimedOut / PoolClosed / Io / ... | N/A | `Storage(Backend)` | Connection failures |
//! | (elapsed) | N/A | `Storage(Timeout)` | Call exceeded the configured bound |
//!
//! ## Concurrency
//!
//! No in-process locks. Each mutation is one statement: stock adjustments are a
//! conditional `UPDATE ... WHERE stock_quantity + $delta >= 0`, and updates only
//! assign the columns present in the patch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::{Span, instrument};
use uuid::Uuid;

use timberyard_catalog::{NewWoodPlank, WoodPlank, WoodPlankPatch};
use timberyard_core::{CatalogError, CatalogResult, PlankId, StorageError, ValidationError};

use crate::config::StoreConfig;

use super::query::{PlankFilter, PlankPage, PlankQuery};
use super::r#trait::CatalogStore;

const SCHEMA: &str = include_str!("../../migrations/0001_wood_planks.sql");

/// Column list shared by every statement that returns rows.
const COLUMNS: &str = "id, sku, name, \
    category::text AS category, wood_type::text AS wood_type, \
    grade::text AS grade, finish::text AS finish, \
    thickness_mm, width_mm, length_mm, price, stock_quantity, unit_of_measure, \
    description, image_url, created_at, updated_at";

/// Strictly-later `updated_at`, applied by every mutating statement.
const TOUCH: &str = "updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')";

/// Postgres-backed catalog store.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PostgresCatalogStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self {
            pool: Arc::new(pool),
            timeout,
        }
    }

    /// Open a pool from configuration. Fails if no database URL is configured.
    pub async fn connect(config: &StoreConfig) -> CatalogResult<Self> {
        let Some(url) = config.database_url.as_deref() else {
            return Err(StorageError::backend("connect", "no database url configured").into());
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.storage_timeout)
            .connect(url)
            .await
            .map_err(|e| StorageError::backend("connect", e.to_string()))?;

        Ok(Self::new(pool, config.storage_timeout))
    }

    /// Apply the (idempotent) catalog schema.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> CatalogResult<()> {
        self.bounded("ensure_schema", async {
            sqlx::raw_sql(SCHEMA)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e, None))?;
            Ok(())
        })
        .await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> CatalogResult<T>
    where
        F: Future<Output = CatalogResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout {
                operation,
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
            .into()),
        }
    }

    async fn fetch_one_by(
        &self,
        operation: &'static str,
        column: &str,
        bind: QueryValue<'_>,
    ) -> CatalogResult<Option<WoodPlank>> {
        let sql = format!("SELECT {COLUMNS} FROM wood_planks WHERE {column} = $1");
        let query = sqlx::query(&sql);
        let query = match bind {
            QueryValue::Id(id) => query.bind(id),
            QueryValue::Text(text) => query.bind(text),
        };
        let row = query
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e, None))?;
        row.map(|r| decode(operation, &r)).transpose()
    }
}

enum QueryValue<'a> {
    Id(Uuid),
    Text(&'a str),
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self, new), fields(sku = %new.sku), err)]
    async fn insert(&self, new: NewWoodPlank) -> CatalogResult<WoodPlank> {
        let sql = format!(
            r#"
            INSERT INTO wood_planks (
                id, sku, name, category, wood_type, grade, finish,
                thickness_mm, width_mm, length_mm, price, stock_quantity,
                unit_of_measure, description, image_url, created_at, updated_at
            )
            VALUES (
                $1, $2, $3,
                $4::text::product_category, $5::text::wood_type,
                $6::text::product_grade, $7::text::finish_type,
                $8, $9, $10, $11, $12, $13, $14, $15, NOW(), NOW()
            )
            RETURNING {COLUMNS}
            "#
        );

        self.bounded("insert", async {
            let row = sqlx::query(&sql)
                .bind(*PlankId::new().as_uuid())
                .bind(&new.sku)
                .bind(&new.name)
                .bind(new.category.as_str())
                .bind(new.wood_type.as_str())
                .bind(new.grade.as_str())
                .bind(new.finish.as_str())
                .bind(new.thickness_mm)
                .bind(new.width_mm)
                .bind(new.length_mm)
                .bind(new.price)
                .bind(new.stock_quantity)
                .bind(&new.unit_of_measure)
                .bind(new.description.as_deref())
                .bind(new.image_url.as_deref())
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("insert", e, Some(&new.sku)))?;
            decode("insert", &row)
        })
        .await
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(&self, id: PlankId) -> CatalogResult<Option<WoodPlank>> {
        self.bounded("get", self.fetch_one_by("get", "id", QueryValue::Id(*id.as_uuid())))
            .await
    }

    #[instrument(skip(self), err)]
    async fn get_by_sku(&self, sku: &str) -> CatalogResult<Option<WoodPlank>> {
        self.bounded(
            "get_by_sku",
            self.fetch_one_by("get_by_sku", "sku", QueryValue::Text(sku)),
        )
        .await
    }

    #[instrument(skip(self, query), fields(total, returned), err)]
    async fn query(&self, query: &PlankQuery) -> CatalogResult<PlankPage> {
        query.filter.validate()?;
        let pagination = query.pagination.clamped();
        let span = Span::current();

        self.bounded("query", async {
            let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM wood_planks");
            push_filter(&mut count, &query.filter);
            let total: i64 = count
                .build_query_scalar()
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("query", e, None))?;

            let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM wood_planks"));
            push_filter(&mut select, &query.filter);
            select.push(" ORDER BY ");
            select.push(query.sort.order_by_sql());
            select.push(" LIMIT ");
            select.push_bind(i64::from(pagination.limit));
            select.push(" OFFSET ");
            select.push_bind(i64::from(pagination.offset));

            let rows = select
                .build()
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("query", e, None))?;
            let items = rows
                .iter()
                .map(|row| decode("query", row))
                .collect::<CatalogResult<Vec<_>>>()?;

            let total = u64::try_from(total).unwrap_or(0);
            span.record("total", total);
            span.record("returned", items.len());
            Ok(PlankPage::new(items, total, pagination))
        })
        .await
    }

    #[instrument(skip(self, patch), fields(id = %id), err)]
    async fn update(&self, id: PlankId, patch: &WoodPlankPatch) -> CatalogResult<WoodPlank> {
        let sql = format!(
            r#"
            UPDATE wood_planks SET
                sku = COALESCE($2, sku),
                name = COALESCE($3, name),
                category = COALESCE($4::text::product_category, category),
                wood_type = COALESCE($5::text::wood_type, wood_type),
                grade = COALESCE($6::text::product_grade, grade),
                finish = COALESCE($7::text::finish_type, finish),
                thickness_mm = COALESCE($8, thickness_mm),
                width_mm = COALESCE($9, width_mm),
                length_mm = COALESCE($10, length_mm),
                price = COALESCE($11, price),
                stock_quantity = COALESCE($12, stock_quantity),
                unit_of_measure = COALESCE($13, unit_of_measure),
                description = CASE WHEN $14 THEN $15 ELSE description END,
                image_url = CASE WHEN $16 THEN $17 ELSE image_url END,
                {TOUCH}
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        self.bounded("update", async {
            let row = sqlx::query(&sql)
                .bind(*id.as_uuid())
                .bind(patch.sku.as_deref())
                .bind(patch.name.as_deref())
                .bind(patch.category.map(|v| v.as_str()))
                .bind(patch.wood_type.map(|v| v.as_str()))
                .bind(patch.grade.map(|v| v.as_str()))
                .bind(patch.finish.map(|v| v.as_str()))
                .bind(patch.thickness_mm)
                .bind(patch.width_mm)
                .bind(patch.length_mm)
                .bind(patch.price)
                .bind(patch.stock_quantity)
                .bind(patch.unit_of_measure.as_deref())
                .bind(patch.description.is_some())
                .bind(patch.description.clone().flatten())
                .bind(patch.image_url.is_some())
                .bind(patch.image_url.clone().flatten())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("update", e, patch.sku.as_deref()))?;

            match row {
                Some(row) => decode("update", &row),
                None => Err(CatalogError::not_found(id)),
            }
        })
        .await
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, id: PlankId) -> CatalogResult<()> {
        self.bounded("delete", async {
            let result = sqlx::query("DELETE FROM wood_planks WHERE id = $1")
                .bind(*id.as_uuid())
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete", e, None))?;
            if result.rows_affected() == 0 {
                return Err(CatalogError::not_found(id));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn adjust_stock(&self, id: PlankId, delta: i32) -> CatalogResult<WoodPlank> {
        let sql = format!(
            r#"
            UPDATE wood_planks SET
                stock_quantity = stock_quantity + $2,
                {TOUCH}
            WHERE id = $1 AND stock_quantity + $2 >= 0
            RETURNING {COLUMNS}
            "#
        );

        self.bounded("adjust_stock", async {
            let row = sqlx::query(&sql)
                .bind(*id.as_uuid())
                .bind(delta)
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("adjust_stock", e, None))?;

            if let Some(row) = row {
                return decode("adjust_stock", &row);
            }

            // Nothing matched: either the item is gone or the guard rejected it.
            let available: Option<i32> =
                sqlx::query_scalar("SELECT stock_quantity FROM wood_planks WHERE id = $1")
                    .bind(*id.as_uuid())
                    .fetch_optional(&*self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("adjust_stock", e, None))?;

            match available {
                Some(available) => Err(CatalogError::InsufficientStock {
                    id: id.to_string(),
                    requested: -i64::from(delta),
                    available: i64::from(available),
                }),
                None => Err(CatalogError::not_found(id)),
            }
        })
        .await
    }
}

/// Append `WHERE` conditions for `filter`. Enum values are bound as text and
/// cast to the column type.
fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a PlankFilter) {
    qb.push(" WHERE TRUE");

    if let Some(category) = filter.category {
        qb.push(" AND category = ")
            .push_bind(category.as_str())
            .push("::text::product_category");
    }
    if let Some(wood_type) = filter.wood_type {
        qb.push(" AND wood_type = ")
            .push_bind(wood_type.as_str())
            .push("::text::wood_type");
    }
    if let Some(grade) = filter.grade {
        qb.push(" AND grade = ")
            .push_bind(grade.as_str())
            .push("::text::product_grade");
    }
    if let Some(finish) = filter.finish {
        qb.push(" AND finish = ")
            .push_bind(finish.as_str())
            .push("::text::finish_type");
    }

    for (column, range) in [
        ("thickness_mm", &filter.thickness_mm),
        ("width_mm", &filter.width_mm),
        ("length_mm", &filter.length_mm),
    ] {
        if let Some(min) = range.min {
            qb.push(format!(" AND {column} >= ")).push_bind(min);
        }
        if let Some(max) = range.max {
            qb.push(format!(" AND {column} <= ")).push_bind(max);
        }
    }
    if let Some(min) = filter.price.min {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.price.max {
        qb.push(" AND price <= ").push_bind(max);
    }

    if filter.in_stock {
        qb.push(" AND stock_quantity > 0");
    }

    if let Some(term) = filter.search_term() {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (sku ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Escape `LIKE` metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Raw row as read from `wood_planks` (classifications still as text).
struct PlankRow {
    id: Uuid,
    sku: String,
    name: String,
    category: String,
    wood_type: String,
    grade: String,
    finish: String,
    thickness_mm: i32,
    width_mm: i32,
    length_mm: i32,
    price: Decimal,
    stock_quantity: i32,
    unit_of_measure: String,
    description: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for PlankRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PlankRow {
            id: row.try_get("id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            wood_type: row.try_get("wood_type")?,
            grade: row.try_get("grade")?,
            finish: row.try_get("finish")?,
            thickness_mm: row.try_get("thickness_mm")?,
            width_mm: row.try_get("width_mm")?,
            length_mm: row.try_get("length_mm")?,
            price: row.try_get("price")?,
            stock_quantity: row.try_get("stock_quantity")?,
            unit_of_measure: row.try_get("unit_of_measure")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl PlankRow {
    fn into_plank(self) -> Result<WoodPlank, ValidationError> {
        Ok(WoodPlank {
            id: PlankId::from_uuid(self.id),
            sku: self.sku,
            name: self.name,
            category: self.category.parse()?,
            wood_type: self.wood_type.parse()?,
            grade: self.grade.parse()?,
            finish: self.finish.parse()?,
            thickness_mm: self.thickness_mm,
            width_mm: self.width_mm,
            length_mm: self.length_mm,
            price: self.price,
            stock_quantity: self.stock_quantity,
            unit_of_measure: self.unit_of_measure,
            description: self.description,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn decode(operation: &'static str, row: &PgRow) -> CatalogResult<WoodPlank> {
    let raw = PlankRow::from_row(row)
        .map_err(|e| StorageError::corrupt(operation, format!("failed to read row: {e}")))?;
    raw.into_plank()
        .map_err(|e| StorageError::corrupt(operation, e.to_string()).into())
}

/// Column named by a `wood_planks_<column>_check` constraint.
fn checked_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("wood_planks_sku_check") => "sku",
        Some("wood_planks_name_check") => "name",
        Some("wood_planks_thickness_mm_check") => "thickness_mm",
        Some("wood_planks_width_mm_check") => "width_mm",
        Some("wood_planks_length_mm_check") => "length_mm",
        Some("wood_planks_price_check") => "price",
        Some("wood_planks_stock_quantity_check") => "stock_quantity",
        Some("wood_planks_unit_of_measure_check") => "unit_of_measure",
        _ => "row",
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error, sku: Option<&str>) -> CatalogError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned());
            match code.as_deref() {
                Some("23505") if db_err.constraint() == Some("wood_planks_sku_key") => {
                    CatalogError::duplicate_sku(sku.unwrap_or_default())
                }
                Some("23514") => CatalogError::validation(
                    checked_field(db_err.constraint()),
                    db_err.message().to_string(),
                ),
                Some("22003") => {
                    let field = if operation == "adjust_stock" {
                        "stock_quantity"
                    } else {
                        "price"
                    };
                    CatalogError::validation(field, db_err.message().to_string())
                }
                _ => StorageError::backend(
                    operation,
                    format!("database error: {}", db_err.message()),
                )
                .into(),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StorageError::backend(operation, "timed out acquiring a connection").into()
        }
        sqlx::Error::PoolClosed => {
            StorageError::backend(operation, "connection pool closed").into()
        }
        other => StorageError::backend(operation, other.to_string()).into(),
    }
}
