//! Product repository trait (port)
//!
//! Lookups only ever see active products. The borrow and return writes are
//! conditional: they apply only when the stored status still matches, and
//! report `None` otherwise so the caller can tell why.

use async_trait::async_trait;
use depot_shared::types::Page;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{BorrowEntry, Product, ReturnEntry};
use crate::error::DomainError;
use crate::query::ProductQuery;

/// Counts over active products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total: u64,
    pub in_stock: u64,
    pub borrowed: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_active_by_id(&self, id: &Uuid) -> Result<Option<Product>, DomainError>;
    async fn find_active_by_barcode(&self, barcode: &str) -> Result<Option<Product>, DomainError>;
    async fn search(&self, query: &ProductQuery) -> Result<Page<Product>, DomainError>;
    async fn create(&self, product: &Product) -> Result<Product, DomainError>;

    /// Writes descriptive fields only; status and borrow attribution are
    /// left as stored. `None` when the product is gone or inactive.
    async fn update_details(&self, product: &Product) -> Result<Option<Product>, DomainError>;

    /// `in_stock -> borrowed` for an active product.
    async fn mark_borrowed(&self, id: &Uuid, entry: &BorrowEntry) -> Result<Option<Product>, DomainError>;

    /// `borrowed -> in_stock` for an active product.
    async fn mark_returned(&self, id: &Uuid, entry: &ReturnEntry) -> Result<Option<Product>, DomainError>;

    async fn soft_delete(&self, id: &Uuid) -> Result<bool, DomainError>;
    async fn stats(&self) -> Result<ProductStats, DomainError>;
    async fn recent(&self, limit: u32) -> Result<Vec<Product>, DomainError>;
    async fn recently_borrowed(&self, limit: u32) -> Result<Vec<Product>, DomainError>;
    /// Distinct non-blank locations of active products, sorted.
    async fn location_names(&self) -> Result<Vec<String>, DomainError>;
    /// Every row including soft-deleted ones, for backups.
    async fn list_all(&self) -> Result<Vec<Product>, DomainError>;
}
