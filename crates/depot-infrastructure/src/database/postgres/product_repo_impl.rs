// ============================================================================
// Depot Infrastructure - PostgreSQL Product Repository
// File: crates/depot-infrastructure/src/database/postgres/product_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use depot_core::domain::{BorrowEntry, Product, ProductStatus, ReturnEntry};
use depot_core::error::DomainError;
use depot_core::query::{contains_pattern, ProductFilter, ProductQuery, COMBINING_DOT_ABOVE, FOLD_FROM, FOLD_TO};
use depot_core::repositories::{ProductRepository, ProductStats};
use depot_shared::types::Page;

use crate::database::error::{map_sqlx_error, unique_violation};

const PRODUCT_COLUMNS: &str = r#"
    id, name, barcode, description, features, image_url, location_image,
    status, location, location_description, borrowed_by, borrowed_by_user_id,
    borrowed_date, return_date, is_active, created_at, updated_at
"#;

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    barcode: Option<String>,
    description: Option<String>,
    features: Option<String>,
    image_url: Option<String>,
    location_image: Option<String>,
    status: String,
    location: Option<String>,
    location_description: Option<String>,
    borrowed_by: Option<String>,
    borrowed_by_user_id: Option<Uuid>,
    borrowed_date: Option<DateTime<Utc>>,
    return_date: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            barcode: row.barcode,
            description: row.description,
            features: row.features,
            image_url: row.image_url,
            location_image: row.location_image,
            status: ProductStatus::from_str(&row.status).unwrap_or_default(),
            location: row.location,
            location_description: row.location_description,
            borrowed_by: row.borrowed_by,
            borrowed_by_user_id: row.borrowed_by_user_id,
            borrowed_date: row.borrowed_date,
            return_date: row.return_date,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Appends the WHERE clause for a product filter. Every search match is one
/// `LIKE` over the lower-cased column, folded through `translate` when the
/// match asks for it.
pub(crate) fn push_product_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE is_active = TRUE");

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location = ").push_bind(location.clone());
    }
    if let Some(search) = &filter.search {
        let fold_from = format!("{}{}", FOLD_FROM, COMBINING_DOT_ABOVE);
        qb.push(" AND (");
        for (i, m) in search.matches.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            if m.folded {
                qb.push("translate(lower(")
                    .push(m.field.column())
                    .push("), ")
                    .push_bind(fold_from.clone())
                    .push(", ")
                    .push_bind(FOLD_TO)
                    .push(")");
            } else {
                qb.push("lower(").push(m.field.column()).push(")");
            }
            qb.push(" LIKE ").push_bind(contains_pattern(&m.needle));
        }
        qb.push(")");
    }
}

fn map_write_error(context: &str, product: &Product, e: sqlx::Error) -> DomainError {
    match unique_violation(&e) {
        Some(constraint) if constraint.contains("barcode") => {
            DomainError::BarcodeAlreadyExists(product.barcode.clone().unwrap_or_default())
        }
        _ => map_sqlx_error(context, e),
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_active_by_id(&self, id: &Uuid) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE id = $1 AND is_active = TRUE",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("finding product by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_active_by_barcode(&self, barcode: &str) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE barcode = $1 AND is_active = TRUE",
            PRODUCT_COLUMNS
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("finding product by barcode", e))?;

        Ok(row.map(Into::into))
    }

    async fn search(&self, query: &ProductQuery) -> Result<Page<Product>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_product_filter(&mut count, &query.filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("counting products", e))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
        push_product_filter(&mut select, &query.filter);
        select
            .push(" ORDER BY ")
            .push(query.sort.field.column())
            .push(" ")
            .push(query.sort.order.as_sql())
            .push(", id ASC LIMIT ")
            .push_bind(i64::from(query.page.limit))
            .push(" OFFSET ")
            .push_bind(query.page.offset() as i64);

        let rows: Vec<ProductRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("searching products", e))?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            total.max(0) as u64,
            query.page,
        ))
    }

    async fn create(&self, product: &Product) -> Result<Product, DomainError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO products (
                id, name, barcode, description, features, image_url, location_image,
                status, location, location_description, borrowed_by, borrowed_by_user_id,
                borrowed_date, return_date, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(&product.features)
        .bind(&product.image_url)
        .bind(&product.location_image)
        .bind(product.status.as_str())
        .bind(&product.location)
        .bind(&product.location_description)
        .bind(&product.borrowed_by)
        .bind(product.borrowed_by_user_id)
        .bind(product.borrowed_date)
        .bind(product.return_date)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error("creating product", product, e))?;

        info!("Product row inserted: {}", row.id);
        Ok(row.into())
    }

    async fn update_details(&self, product: &Product) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products SET
                name = $2,
                barcode = $3,
                description = $4,
                features = $5,
                image_url = $6,
                location_image = $7,
                location = $8,
                location_description = $9,
                updated_at = $10
            WHERE id = $1 AND is_active = TRUE
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(&product.features)
        .bind(&product.image_url)
        .bind(&product.location_image)
        .bind(&product.location)
        .bind(&product.location_description)
        .bind(product.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error("updating product", product, e))?;

        Ok(row.map(Into::into))
    }

    async fn mark_borrowed(&self, id: &Uuid, entry: &BorrowEntry) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products SET
                status = 'borrowed',
                borrowed_by = $2,
                borrowed_by_user_id = $3,
                borrowed_date = $4,
                return_date = NULL,
                updated_at = $4
            WHERE id = $1 AND is_active = TRUE AND status = 'in_stock'
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(&entry.borrowed_by)
        .bind(entry.borrowed_by_user_id)
        .bind(entry.borrowed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("borrowing product", e))?;

        Ok(row.map(Into::into))
    }

    async fn mark_returned(&self, id: &Uuid, entry: &ReturnEntry) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products SET
                status = 'in_stock',
                borrowed_by = NULL,
                borrowed_by_user_id = NULL,
                borrowed_date = NULL,
                return_date = $2,
                location = COALESCE($3, location),
                location_description = COALESCE($4, location_description),
                location_image = COALESCE($5, location_image),
                updated_at = $2
            WHERE id = $1 AND is_active = TRUE AND status = 'borrowed'
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(entry.returned_at)
        .bind(&entry.location)
        .bind(&entry.location_description)
        .bind(&entry.location_image)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("returning product", e))?;

        Ok(row.map(Into::into))
    }

    async fn soft_delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("deleting product", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> Result<ProductStats, DomainError> {
        let (total, in_stock, borrowed): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'in_stock'),
                COUNT(*) FILTER (WHERE status = 'borrowed')
            FROM products
            WHERE is_active = TRUE
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("counting product stats", e))?;

        Ok(ProductStats {
            total: total.max(0) as u64,
            in_stock: in_stock.max(0) as u64,
            borrowed: borrowed.max(0) as u64,
        })
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Product>, DomainError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE is_active = TRUE ORDER BY created_at DESC, id LIMIT $1",
            PRODUCT_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("listing recent products", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recently_borrowed(&self, limit: u32) -> Result<Vec<Product>, DomainError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM products
            WHERE is_active = TRUE AND status = 'borrowed'
            ORDER BY borrowed_date DESC, id
            LIMIT $1
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("listing borrowed products", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn location_names(&self) -> Result<Vec<String>, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT DISTINCT location FROM products
            WHERE is_active = TRUE AND location IS NOT NULL AND BTRIM(location) <> ''
            ORDER BY location
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("listing product locations", e))
    }

    async fn list_all(&self) -> Result<Vec<Product>, DomainError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products ORDER BY created_at, id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("exporting products", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::query::ProductQuery;

    fn rendered(query: &ProductQuery) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_product_filter(&mut qb, &query.filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_filter_without_search() {
        let query = ProductQuery::from_params(None, Some("borrowed"), Some("Shelf A"), None, None, None, None).unwrap();
        assert_eq!(
            rendered(&query),
            "SELECT COUNT(*) FROM products WHERE is_active = TRUE AND status = $1 AND location = $2"
        );
    }

    #[test]
    fn test_search_binds_every_needle() {
        let query = ProductQuery::from_params(Some("çanta"), None, None, None, None, None, None).unwrap();
        let sql = rendered(&query);
        let matches = query.filter.search.as_ref().unwrap().matches.len();

        assert_eq!(sql.matches(" LIKE ").count(), matches);
        assert!(sql.contains("lower(borrowed_by) LIKE"));
        assert!(sql.contains("translate(lower(name), $"));
        assert!(!sql.contains("çanta"));
    }
}
