use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use depot_core::domain::{BorrowEntry, Product, ProductStatus, ReturnEntry};
use depot_core::error::DomainError;
use depot_core::query::ProductQuery;
use depot_core::repositories::{ProductRepository, ProductStats};
use depot_shared::types::Page;

use super::paginate;

fn top_active(
    products: &HashMap<Uuid, Product>,
    keep: impl Fn(&Product) -> bool,
    order: impl FnMut(&Product, &Product) -> Ordering,
    limit: u32,
) -> Vec<Product> {
    let mut matching: Vec<Product> = products
        .values()
        .filter(|p| p.is_active && keep(p))
        .cloned()
        .collect();
    matching.sort_by(order);
    matching.truncate(limit as usize);
    matching
}

/// Borrow and return run the entity transition under the write lock, which
/// gives the same compare-and-set behavior as the conditional SQL updates.
#[derive(Default)]
pub struct MemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn barcode_taken(products: &HashMap<Uuid, Product>, product: &Product) -> bool {
        match &product.barcode {
            Some(barcode) => products.values().any(|p| {
                p.id != product.id && p.is_active && p.barcode.as_deref() == Some(barcode.as_str())
            }),
            None => false,
        }
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn find_active_by_id(&self, id: &Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self
            .products
            .read()
            .await
            .get(id)
            .filter(|p| p.is_active)
            .cloned())
    }

    async fn find_active_by_barcode(&self, barcode: &str) -> Result<Option<Product>, DomainError> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .find(|p| p.is_active && p.barcode.as_deref() == Some(barcode))
            .cloned())
    }

    async fn search(&self, query: &ProductQuery) -> Result<Page<Product>, DomainError> {
        let products = self.products.read().await;
        let mut matching: Vec<Product> = products
            .values()
            .filter(|p| query.filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));
        Ok(paginate(&matching, query.page))
    }

    async fn create(&self, product: &Product) -> Result<Product, DomainError> {
        let mut products = self.products.write().await;
        if Self::barcode_taken(&products, product) {
            return Err(DomainError::BarcodeAlreadyExists(
                product.barcode.clone().unwrap_or_default(),
            ));
        }
        let mut stored = product.clone();
        stored.enforce_status_invariant();
        products.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_details(&self, product: &Product) -> Result<Option<Product>, DomainError> {
        let mut products = self.products.write().await;
        if Self::barcode_taken(&products, product) {
            return Err(DomainError::BarcodeAlreadyExists(
                product.barcode.clone().unwrap_or_default(),
            ));
        }
        let Some(stored) = products.get_mut(&product.id).filter(|p| p.is_active) else {
            return Ok(None);
        };
        stored.name = product.name.clone();
        stored.barcode = product.barcode.clone();
        stored.description = product.description.clone();
        stored.features = product.features.clone();
        stored.image_url = product.image_url.clone();
        stored.location_image = product.location_image.clone();
        stored.location = product.location.clone();
        stored.location_description = product.location_description.clone();
        stored.updated_at = product.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn mark_borrowed(&self, id: &Uuid, entry: &BorrowEntry) -> Result<Option<Product>, DomainError> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(id).filter(|p| p.is_active) else {
            return Ok(None);
        };
        if product.borrow(entry).is_err() {
            return Ok(None);
        }
        Ok(Some(product.clone()))
    }

    async fn mark_returned(&self, id: &Uuid, entry: &ReturnEntry) -> Result<Option<Product>, DomainError> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(id).filter(|p| p.is_active) else {
            return Ok(None);
        };
        if product.return_to_stock(entry).is_err() {
            return Ok(None);
        }
        Ok(Some(product.clone()))
    }

    async fn soft_delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let mut products = self.products.write().await;
        match products.get_mut(id).filter(|p| p.is_active) {
            Some(product) => {
                product.is_active = false;
                product.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn stats(&self) -> Result<ProductStats, DomainError> {
        let products = self.products.read().await;
        let active: Vec<&Product> = products.values().filter(|p| p.is_active).collect();
        let borrowed = active
            .iter()
            .filter(|p| p.status == ProductStatus::Borrowed)
            .count() as u64;
        let total = active.len() as u64;
        Ok(ProductStats {
            total,
            in_stock: total - borrowed,
            borrowed,
        })
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Product>, DomainError> {
        let products = self.products.read().await;
        Ok(top_active(
            &products,
            |_| true,
            |a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)),
            limit,
        ))
    }

    async fn recently_borrowed(&self, limit: u32) -> Result<Vec<Product>, DomainError> {
        let products = self.products.read().await;
        Ok(top_active(
            &products,
            |p| p.status == ProductStatus::Borrowed,
            |a, b| b.borrowed_date.cmp(&a.borrowed_date).then_with(|| a.id.cmp(&b.id)),
            limit,
        ))
    }

    async fn location_names(&self) -> Result<Vec<String>, DomainError> {
        let mut names: Vec<String> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.is_active)
            .filter_map(|p| p.location.clone())
            .filter(|l| !l.trim().is_empty())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn list_all(&self) -> Result<Vec<Product>, DomainError> {
        let mut all: Vec<Product> = self.products.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}
