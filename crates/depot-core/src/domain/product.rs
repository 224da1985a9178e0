// ============================================================================
// Depot Core - Product Entity
// File: crates/depot-core/src/domain/product.rs
// Description: Product with the in_stock <-> borrowed lifecycle
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use depot_shared::constants::{MAX_NAME_LENGTH, MIN_NAME_LENGTH};
use depot_shared::utils::{merge_text, non_blank};

use crate::domain::image_ref::{sanitize_image_ref, sanitize_or_keep};
use crate::error::DomainError;

/// Lifecycle state of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    InStock,
    Borrowed,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::InStock => "in_stock",
            ProductStatus::Borrowed => "borrowed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_stock" => Some(ProductStatus::InStock),
            "borrowed" => Some(ProductStatus::Borrowed),
            _ => None,
        }
    }
}

/// Product entity
///
/// `status == Borrowed` holds exactly when `borrowed_by` and `borrowed_date`
/// are set; an in-stock product never carries borrow attribution.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,

    #[validate(length(min = 2, max = 255, message = "Product name must be between 2 and 255 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "Barcode too long"))]
    pub barcode: Option<String>,

    pub description: Option<String>,
    pub features: Option<String>,

    pub image_url: Option<String>,

    pub location_image: Option<String>,

    pub status: ProductStatus,

    #[validate(length(max = 255, message = "Location too long"))]
    pub location: Option<String>,

    pub location_description: Option<String>,

    #[validate(length(max = 255, message = "Borrower name too long"))]
    pub borrowed_by: Option<String>,

    pub borrowed_by_user_id: Option<Uuid>,
    pub borrowed_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload as received from a client.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub features: Option<String>,
    pub image_url: Option<String>,
    pub location_image: Option<String>,
    pub location: Option<String>,
    pub location_description: Option<String>,
}

/// Edit payload. Every field follows keep-previous semantics: missing or
/// blank values leave the stored value untouched. Status is not editable.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub features: Option<String>,
    pub image_url: Option<String>,
    pub location_image: Option<String>,
    pub location: Option<String>,
    pub location_description: Option<String>,
}

/// Validated effect of a Borrow transition.
#[derive(Debug, Clone, PartialEq)]
pub struct BorrowEntry {
    pub borrowed_by: String,
    pub borrowed_by_user_id: Option<Uuid>,
    pub borrowed_at: DateTime<Utc>,
}

impl BorrowEntry {
    pub fn new(
        borrowed_by: Option<&str>,
        borrowed_by_user_id: Option<Uuid>,
        borrowed_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = non_blank(borrowed_by)
            .filter(|n| (MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&n.chars().count()))
            .ok_or_else(|| {
                DomainError::ValidationError(
                    "Borrower name must be between 2 and 255 characters".to_string(),
                )
            })?;
        Ok(Self {
            borrowed_by: name,
            borrowed_by_user_id,
            borrowed_at,
        })
    }
}

/// Validated effect of a Return transition. `None` placement fields keep the
/// product's previous value; blank or rejected input was already folded into
/// `None` by the constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnEntry {
    pub location: Option<String>,
    pub location_description: Option<String>,
    pub location_image: Option<String>,
    pub returned_at: DateTime<Utc>,
}

impl ReturnEntry {
    pub fn new(
        location: Option<&str>,
        location_description: Option<&str>,
        location_image: Option<&str>,
        returned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            location: non_blank(location),
            location_description: non_blank(location_description),
            location_image: location_image.and_then(sanitize_image_ref),
            returned_at,
        }
    }
}

impl Product {
    pub fn new(input: &NewProduct) -> Result<Self, DomainError> {
        let name = non_blank(input.name.as_deref())
            .filter(|n| n.chars().count() >= MIN_NAME_LENGTH)
            .ok_or_else(|| {
                DomainError::ValidationError("Product name must be at least 2 characters".to_string())
            })?;

        let now = Utc::now();
        let product = Self {
            id: Uuid::new_v4(),
            name,
            barcode: non_blank(input.barcode.as_deref()),
            description: non_blank(input.description.as_deref()),
            features: non_blank(input.features.as_deref()),
            image_url: input.image_url.as_deref().and_then(sanitize_image_ref),
            location_image: input.location_image.as_deref().and_then(sanitize_image_ref),
            status: ProductStatus::InStock,
            location: non_blank(input.location.as_deref()),
            location_description: non_blank(input.location_description.as_deref()),
            borrowed_by: None,
            borrowed_by_user_id: None,
            borrowed_date: None,
            return_date: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        product.validate()?;
        Ok(product)
    }

    pub fn is_borrowed(&self) -> bool {
        self.status == ProductStatus::Borrowed
    }

    /// in_stock -> borrowed
    pub fn borrow(&mut self, entry: &BorrowEntry) -> Result<(), DomainError> {
        if self.is_borrowed() {
            return Err(DomainError::AlreadyBorrowed);
        }
        self.status = ProductStatus::Borrowed;
        self.borrowed_by = Some(entry.borrowed_by.clone());
        self.borrowed_by_user_id = entry.borrowed_by_user_id;
        self.borrowed_date = Some(entry.borrowed_at);
        self.return_date = None;
        self.updated_at = entry.borrowed_at;
        Ok(())
    }

    /// borrowed -> in_stock, optionally re-placing the product.
    pub fn return_to_stock(&mut self, entry: &ReturnEntry) -> Result<(), DomainError> {
        if !self.is_borrowed() {
            return Err(DomainError::AlreadyInStock);
        }
        self.status = ProductStatus::InStock;
        self.return_date = Some(entry.returned_at);
        if let Some(location) = &entry.location {
            self.location = Some(location.clone());
        }
        if let Some(description) = &entry.location_description {
            self.location_description = Some(description.clone());
        }
        if let Some(image) = &entry.location_image {
            self.location_image = Some(image.clone());
        }
        self.updated_at = entry.returned_at;
        self.enforce_status_invariant();
        Ok(())
    }

    /// Descriptive edit. Leaves `status` and borrow attribution alone.
    pub fn apply_changes(&mut self, changes: &ProductChanges) -> Result<(), DomainError> {
        self.name = merge_text(changes.name.as_deref(), Some(self.name.as_str())).unwrap_or_default();
        if self.name.chars().count() < MIN_NAME_LENGTH {
            return Err(DomainError::ValidationError(
                "Product name must be at least 2 characters".to_string(),
            ));
        }
        self.barcode = merge_text(changes.barcode.as_deref(), self.barcode.as_deref());
        self.description = merge_text(changes.description.as_deref(), self.description.as_deref());
        self.features = merge_text(changes.features.as_deref(), self.features.as_deref());
        self.image_url = sanitize_or_keep(changes.image_url.as_deref(), self.image_url.as_deref());
        self.location_image =
            sanitize_or_keep(changes.location_image.as_deref(), self.location_image.as_deref());
        self.location = merge_text(changes.location.as_deref(), self.location.as_deref());
        self.location_description = merge_text(
            changes.location_description.as_deref(),
            self.location_description.as_deref(),
        );
        self.updated_at = Utc::now();
        self.validate()?;
        Ok(())
    }

    /// An in-stock product carries no borrow attribution, whatever code
    /// path put it there.
    pub fn enforce_status_invariant(&mut self) {
        if self.status == ProductStatus::InStock {
            self.borrowed_by = None;
            self.borrowed_by_user_id = None;
            self.borrowed_date = None;
        }
    }

    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn is_consistent(&self) -> bool {
        match self.status {
            ProductStatus::Borrowed => self.borrowed_by.is_some() && self.borrowed_date.is_some(),
            ProductStatus::InStock => {
                self.borrowed_by.is_none()
                    && self.borrowed_by_user_id.is_none()
                    && self.borrowed_date.is_none()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn laptop() -> Product {
        Product::new(&NewProduct {
            name: Some("Dell Latitude".into()),
            location: Some("Shelf A".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_product_starts_in_stock() {
        let product = laptop();
        assert_eq!(product.status, ProductStatus::InStock);
        assert!(product.is_active);
        assert!(product.is_consistent());
    }

    #[test]
    fn test_new_product_validation() {
        let err = Product::new(&NewProduct { name: Some(" a ".into()), ..Default::default() });
        assert!(matches!(err, Err(DomainError::ValidationError(_))));
        let err = Product::new(&NewProduct::default());
        assert!(matches!(err, Err(DomainError::ValidationError(_))));
        let err = Product::new(&NewProduct { name: Some("x".repeat(256)), ..Default::default() });
        assert!(matches!(err, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_new_product_drops_invalid_images() {
        let product = Product::new(&NewProduct {
            name: Some("Camera".into()),
            image_url: Some("javascript:alert(1)".into()),
            location_image: Some("/uploads/shelf.jpg".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(product.image_url.is_none());
        assert_eq!(product.location_image.as_deref(), Some("/uploads/shelf.jpg"));
    }

    #[test]
    fn test_borrow_sets_attribution() {
        let mut product = laptop();
        product.return_date = Some(Utc::now());
        let now = Utc::now();
        let user = Uuid::new_v4();
        product.borrow(&BorrowEntry::new(Some(" Alice "), Some(user), now).unwrap()).unwrap();

        assert_eq!(product.status, ProductStatus::Borrowed);
        assert_eq!(product.borrowed_by.as_deref(), Some("Alice"));
        assert_eq!(product.borrowed_by_user_id, Some(user));
        assert_eq!(product.borrowed_date, Some(now));
        assert!(product.return_date.is_none());
        assert!(product.is_consistent());
    }

    #[test]
    fn test_borrow_twice_rejected_and_unchanged() {
        let mut product = laptop();
        product.borrow(&BorrowEntry::new(Some("Alice"), None, Utc::now()).unwrap()).unwrap();
        let before = product.clone();

        let again = BorrowEntry::new(Some("Bob"), None, Utc::now()).unwrap();
        assert!(matches!(product.borrow(&again), Err(DomainError::AlreadyBorrowed)));
        assert_eq!(product.borrowed_by, before.borrowed_by);
        assert_eq!(product.borrowed_date, before.borrowed_date);
    }

    #[test]
    fn test_borrower_name_required() {
        assert!(BorrowEntry::new(None, None, Utc::now()).is_err());
        assert!(BorrowEntry::new(Some(" A "), None, Utc::now()).is_err());
    }

    #[test]
    fn test_return_in_stock_rejected() {
        let mut product = laptop();
        let before = product.clone();
        let entry = ReturnEntry::new(Some("Shelf B"), None, None, Utc::now());
        assert!(matches!(product.return_to_stock(&entry), Err(DomainError::AlreadyInStock)));
        assert_eq!(product.location, before.location);
        assert_eq!(product.return_date, before.return_date);
    }

    #[test]
    fn test_borrow_return_roundtrip() {
        let mut product = laptop();
        let borrowed_at = Utc::now();
        product.borrow(&BorrowEntry::new(Some("Alice"), None, borrowed_at).unwrap()).unwrap();

        let returned_at = borrowed_at + Duration::seconds(5);
        product
            .return_to_stock(&ReturnEntry::new(Some("Shelf B"), None, None, returned_at))
            .unwrap();

        assert_eq!(product.status, ProductStatus::InStock);
        assert!(product.borrowed_by.is_none());
        assert!(product.borrowed_by_user_id.is_none());
        assert!(product.borrowed_date.is_none());
        assert_eq!(product.location.as_deref(), Some("Shelf B"));
        assert!(product.return_date.unwrap() >= borrowed_at);
        assert!(product.is_consistent());
    }

    #[test]
    fn test_return_blank_fields_keep_previous_placement() {
        let mut product = laptop();
        product.location_description = Some("Top row".into());
        product.location_image = Some("/uploads/a.jpg".into());
        product.borrow(&BorrowEntry::new(Some("Alice"), None, Utc::now()).unwrap()).unwrap();

        let entry = ReturnEntry::new(Some(""), None, Some("not-an-image"), Utc::now());
        product.return_to_stock(&entry).unwrap();

        assert_eq!(product.location.as_deref(), Some("Shelf A"));
        assert_eq!(product.location_description.as_deref(), Some("Top row"));
        assert_eq!(product.location_image.as_deref(), Some("/uploads/a.jpg"));
    }

    #[test]
    fn test_apply_changes_does_not_touch_status() {
        let mut product = laptop();
        product.borrow(&BorrowEntry::new(Some("Alice"), None, Utc::now()).unwrap()).unwrap();
        product
            .apply_changes(&ProductChanges {
                name: Some("Dell Latitude 5520".into()),
                description: Some("".into()),
                image_url: Some("https://img.example.com/x.png".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.name, "Dell Latitude 5520");
        assert_eq!(product.status, ProductStatus::Borrowed);
        assert_eq!(product.borrowed_by.as_deref(), Some("Alice"));
        assert_eq!(product.image_url.as_deref(), Some("https://img.example.com/x.png"));
    }

    #[test]
    fn test_enforce_status_invariant_clears_attribution() {
        let mut product = laptop();
        product.borrowed_by = Some("Stale".into());
        product.borrowed_by_user_id = Some(Uuid::new_v4());
        product.borrowed_date = Some(Utc::now());
        assert!(!product.is_consistent());

        product.enforce_status_invariant();
        assert!(product.is_consistent());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_value(laptop()).unwrap();
        assert_eq!(json["status"], "in_stock");
        assert!(json.get("borrowedBy").is_some());
    }
}
