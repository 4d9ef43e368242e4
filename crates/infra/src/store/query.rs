//! Catalog query model: filters, sort order and pagination.
//!
//! The same types drive the in-memory store (via [`PlankFilter::matches`] and
//! [`PlankSort::compare`]) and the Postgres store (via the SQL fragments), so
//! both backends agree on membership and order.

use core::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use timberyard_catalog::{FinishType, ProductCategory, ProductGrade, WoodPlank, WoodType};
use timberyard_core::ValidationError;

/// Pagination parameters for catalog listings.
///
/// Deserialized values go through [`Pagination::new`], so a missing limit
/// falls back to the default and an oversized one is capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PaginationParams")]
pub struct Pagination {
    /// Maximum number of items to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 1000;

    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    /// The same window with the limit capped at [`Pagination::MAX_LIMIT`].
    /// Stores apply this before reading, whatever way the value was built.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.min(Self::MAX_LIMIT),
            ..self
        }
    }
}

#[derive(Deserialize)]
struct PaginationParams {
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    offset: Option<u32>,
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self::new(params.limit, params.offset)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Inclusive bounds on one field. A missing side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusiveRange<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Default for InclusiveRange<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

impl<T: PartialOrd + Copy + core::fmt::Display> InclusiveRange<T> {
    pub fn between(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: T) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: T) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    fn check(&self, field: &'static str) -> Result<(), ValidationError> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(ValidationError::new(
                field,
                format!("range minimum {min} is greater than maximum {max}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Conjunctive filter over catalog items. Every `None`/default dimension means
/// "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlankFilter {
    pub category: Option<ProductCategory>,
    pub wood_type: Option<WoodType>,
    pub grade: Option<ProductGrade>,
    pub finish: Option<FinishType>,
    pub thickness_mm: InclusiveRange<i32>,
    pub width_mm: InclusiveRange<i32>,
    pub length_mm: InclusiveRange<i32>,
    pub price: InclusiveRange<Decimal>,
    /// Only items with `stock_quantity > 0`.
    pub in_stock: bool,
    /// Case-insensitive substring over sku, name and description.
    pub search: Option<String>,
}

impl PlankFilter {
    /// Reject filters that cannot match anything by construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.thickness_mm.check("thickness_mm")?;
        self.width_mm.check("width_mm")?;
        self.length_mm.check("length_mm")?;
        self.price.check("price")?;
        Ok(())
    }

    /// Search term with surrounding whitespace removed; blank means no search.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn matches(&self, plank: &WoodPlank) -> bool {
        self.category.is_none_or(|c| plank.category == c)
            && self.wood_type.is_none_or(|w| plank.wood_type == w)
            && self.grade.is_none_or(|g| plank.grade == g)
            && self.finish.is_none_or(|f| plank.finish == f)
            && self.thickness_mm.contains(plank.thickness_mm)
            && self.width_mm.contains(plank.width_mm)
            && self.length_mm.contains(plank.length_mm)
            && self.price.contains(plank.price)
            && (!self.in_stock || plank.stock_quantity > 0)
            && self.search_term().is_none_or(|term| matches_search(plank, term))
    }
}

fn matches_search(plank: &WoodPlank, term: &str) -> bool {
    let needle = term.to_lowercase();
    plank.sku.to_lowercase().contains(&needle)
        || plank.name.to_lowercase().contains(&needle)
        || plank
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

/// Field a listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Sku,
    Name,
    Price,
    StockQuantity,
    LengthMm,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort order of a listing. Ties are always broken by id (ascending), so the
/// order is total and pagination is stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlankSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl PlankSort {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn compare(&self, a: &WoodPlank, b: &WoodPlank) -> Ordering {
        let primary = match self.key {
            SortKey::Sku => a.sku.cmp(&b.sku),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::StockQuantity => a.stock_quantity.cmp(&b.stock_quantity),
            SortKey::LengthMm => a.length_mm.cmp(&b.length_mm),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// `ORDER BY` body for SQL stores. Built only from fixed column names.
    pub fn order_by_sql(&self) -> String {
        let column = match self.key {
            SortKey::Sku => "sku COLLATE \"C\"",
            SortKey::Name => "name COLLATE \"C\"",
            SortKey::Price => "price",
            SortKey::StockQuantity => "stock_quantity",
            SortKey::LengthMm => "length_mm",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        };
        let direction = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!("{column} {direction}, id ASC")
    }
}

/// A full listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlankQuery {
    pub filter: PlankFilter,
    pub sort: PlankSort,
    pub pagination: Pagination,
}

impl PlankQuery {
    pub fn new(filter: PlankFilter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort = PlankSort::new(key, direction);
        self
    }

    pub fn page(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlankPage {
    /// The items on this page, in listing order.
    pub items: Vec<WoodPlank>,
    /// Total number of items matching the filter (across all pages).
    pub total: u64,
    /// Pagination parameters used.
    pub pagination: Pagination,
    /// Whether there are more items after this page.
    pub has_more: bool,
}

impl PlankPage {
    pub fn new(items: Vec<WoodPlank>, total: u64, pagination: Pagination) -> Self {
        let has_more = total > u64::from(pagination.offset) + u64::from(pagination.limit);
        Self {
            items,
            total,
            pagination,
            has_more,
        }
    }
}
