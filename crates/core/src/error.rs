//! Catalog error model.

use thiserror::Error;

/// Result type used across the catalog and its stores.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A single field-level constraint violation.
///
/// Raised before anything is persisted; the caller can correct the named field
/// and retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Persistence-layer failure.
///
/// Infrastructure concerns only (timeouts, driver errors, undecodable rows).
/// Never constructed by pure domain code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The storage call did not complete within the configured bound.
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: &'static str, after_ms: u64 },

    /// The backend reported a failure (connection, pool, SQL error, ...).
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    /// A persisted row could not be decoded into a catalog item.
    #[error("{operation} read an undecodable row: {message}")]
    Corrupt {
        operation: &'static str,
        message: String,
    },
}

impl StorageError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    pub fn corrupt(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Corrupt {
            operation,
            message: message.into(),
        }
    }
}

/// Catalog-level error returned by every repository and stock operation.
///
/// All variants are recoverable; none of them leave partial state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A field failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Another live item already uses this SKU.
    #[error("duplicate sku: {sku}")]
    DuplicateSku { sku: String },

    /// The target item does not exist. `id` is the lookup key as rendered by
    /// the caller (a plank id, or `sku:<value>` for SKU lookups).
    #[error("not found: {id}")]
    NotFound { id: String },

    /// A stock adjustment would drive the quantity below zero.
    #[error("insufficient stock for {id}: requested {requested}, available {available}")]
    InsufficientStock {
        id: String,
        requested: i64,
        available: i64,
    },

    /// The persistence layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CatalogError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, reason))
    }

    pub fn duplicate_sku(sku: impl Into<String>) -> Self {
        Self::DuplicateSku { sku: sku.into() }
    }

    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    pub fn sku_not_found(sku: &str) -> Self {
        Self::NotFound {
            id: format!("sku:{sku}"),
        }
    }

    /// Whether retrying the same call may succeed without caller changes.
    ///
    /// Only storage timeouts and backend failures qualify; retry policy itself
    /// belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Storage(StorageError::Timeout { .. } | StorageError::Backend { .. })
        )
    }
}
