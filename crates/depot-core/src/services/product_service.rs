// ============================================================================
// Depot Core - Product Service
// File: crates/depot-core/src/services/product_service.rs
// Description: Product catalogue and the borrow/return lifecycle
// ============================================================================

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use depot_shared::constants::RECENT_ITEMS_LIMIT;
use depot_shared::types::Page;
use depot_shared::utils::non_blank;

use crate::domain::{BorrowEntry, NewProduct, Product, ProductChanges, ProductStatus, ReturnEntry};
use crate::error::DomainError;
use crate::query::ProductQuery;
use crate::repositories::{ProductRepository, ProductStats, UserRepository};

/// Dashboard figures for the product catalogue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOverview {
    pub stats: ProductStats,
    pub recent_products: Vec<Product>,
    pub recently_borrowed: Vec<Product>,
}

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { products, users }
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<Page<Product>, DomainError> {
        self.products.search(query).await
    }

    pub async fn get(&self, id: &Uuid) -> Result<Product, DomainError> {
        self.products
            .find_active_by_id(id)
            .await?
            .ok_or(DomainError::ProductNotFound)
    }

    pub async fn get_by_barcode(&self, barcode: &str) -> Result<Product, DomainError> {
        let barcode = non_blank(Some(barcode)).ok_or(DomainError::BarcodeNotFound)?;
        self.products
            .find_active_by_barcode(&barcode)
            .await?
            .ok_or(DomainError::BarcodeNotFound)
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product, DomainError> {
        let product = Product::new(&input)?;
        if let Some(barcode) = &product.barcode {
            self.ensure_barcode_free(barcode, None).await?;
        }

        let created = self.products.create(&product).await?;
        info!("Product created: {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: &Uuid, changes: ProductChanges) -> Result<Product, DomainError> {
        let mut product = self.get(id).await?;
        let previous_barcode = product.barcode.clone();
        product.apply_changes(&changes)?;

        if let Some(barcode) = &product.barcode {
            if previous_barcode.as_deref() != Some(barcode.as_str()) {
                self.ensure_barcode_free(barcode, Some(id)).await?;
            }
        }

        let updated = self
            .products
            .update_details(&product)
            .await?
            .ok_or(DomainError::ProductNotFound)?;
        info!("Product updated: {}", updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        if !self.products.soft_delete(id).await? {
            return Err(DomainError::ProductNotFound);
        }
        info!("Product deleted: {}", id);
        Ok(())
    }

    pub async fn borrow(
        &self,
        id: &Uuid,
        borrowed_by: Option<&str>,
        borrowed_by_user_id: Option<Uuid>,
    ) -> Result<Product, DomainError> {
        let entry = BorrowEntry::new(borrowed_by, borrowed_by_user_id, Utc::now())?;

        if let Some(user_id) = entry.borrowed_by_user_id {
            match self.users.find_by_id(&user_id).await? {
                Some(user) if user.is_active => {}
                _ => return Err(self.explain_rejected_borrower(id, &user_id).await),
            }
        }

        match self.products.mark_borrowed(id, &entry).await? {
            Some(product) => {
                info!("Product {} borrowed by {}", product.id, entry.borrowed_by);
                Ok(product)
            }
            None => Err(self.explain_rejected_transition(id, ProductStatus::Borrowed).await),
        }
    }

    pub async fn return_product(
        &self,
        id: &Uuid,
        location: Option<&str>,
        location_description: Option<&str>,
        location_image: Option<&str>,
    ) -> Result<Product, DomainError> {
        let entry = ReturnEntry::new(location, location_description, location_image, Utc::now());

        match self.products.mark_returned(id, &entry).await? {
            Some(product) => {
                info!("Product {} returned to stock", product.id);
                Ok(product)
            }
            None => Err(self.explain_rejected_transition(id, ProductStatus::InStock).await),
        }
    }

    /// Product lookup and state errors outrank an unknown borrower.
    async fn explain_rejected_borrower(&self, id: &Uuid, user_id: &Uuid) -> DomainError {
        match self.products.find_active_by_id(id).await {
            Err(e) => e,
            Ok(None) => DomainError::ProductNotFound,
            Ok(Some(product)) if product.status == ProductStatus::Borrowed => {
                warn!("Product {} is already borrowed", id);
                DomainError::AlreadyBorrowed
            }
            Ok(Some(_)) => {
                warn!("Borrow of {} rejected: borrower {} not found or inactive", id, user_id);
                DomainError::BorrowerNotFound
            }
        }
    }

    /// A conditional write touched no row: either the product is gone or
    /// it is already in the `target` state.
    async fn explain_rejected_transition(&self, id: &Uuid, target: ProductStatus) -> DomainError {
        let current = match self.products.find_active_by_id(id).await {
            Ok(current) => current,
            Err(e) => return e,
        };
        match current {
            None => DomainError::ProductNotFound,
            Some(product) if product.status == target => {
                warn!("Product {} is already {}", id, target.as_str());
                match target {
                    ProductStatus::Borrowed => DomainError::AlreadyBorrowed,
                    ProductStatus::InStock => DomainError::AlreadyInStock,
                }
            }
            Some(_) => DomainError::InternalError(format!(
                "Product {} changed state concurrently",
                id
            )),
        }
    }

    pub async fn overview(&self) -> Result<ProductOverview, DomainError> {
        Ok(ProductOverview {
            stats: self.products.stats().await?,
            recent_products: self.products.recent(RECENT_ITEMS_LIMIT).await?,
            recently_borrowed: self.products.recently_borrowed(RECENT_ITEMS_LIMIT).await?,
        })
    }

    pub async fn stats(&self) -> Result<ProductStats, DomainError> {
        self.products.stats().await
    }

    pub async fn location_names(&self) -> Result<Vec<String>, DomainError> {
        self.products.location_names().await
    }

    async fn ensure_barcode_free(&self, barcode: &str, owner: Option<&Uuid>) -> Result<(), DomainError> {
        match self.products.find_active_by_barcode(barcode).await? {
            Some(existing) if Some(&existing.id) != owner => {
                warn!("Barcode {} already used by product {}", barcode, existing.id);
                Err(DomainError::BarcodeAlreadyExists(barcode.to_string()))
            }
            _ => Ok(()),
        }
    }
}
