//! PostgreSQL location repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use depot_core::domain::Location;
use depot_core::error::DomainError;
use depot_core::query::contains_pattern;
use depot_core::repositories::LocationRepository;

use crate::database::error::{map_sqlx_error, unique_violation};

const LOCATION_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LocationRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn map_write_error(context: &str, location: &Location, e: sqlx::Error) -> DomainError {
    match unique_violation(&e) {
        Some(constraint) if constraint.contains("name") => {
            DomainError::LocationNameAlreadyExists(location.name.clone())
        }
        _ => map_sqlx_error(context, e),
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn list(&self, search: Option<String>, active_only: bool) -> Result<Vec<Location>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM locations WHERE TRUE",
            LOCATION_COLUMNS
        ));
        if let Some(search) = search {
            qb.push(" AND lower(name) LIKE ")
                .push_bind(contains_pattern(&search.to_lowercase()));
        }
        if active_only {
            qb.push(" AND is_active = TRUE");
        }
        qb.push(" ORDER BY created_at DESC, id");

        let rows: Vec<LocationRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("listing locations", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Location>, DomainError> {
        let row: Option<LocationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM locations WHERE id = $1",
            LOCATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("finding location", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Location>, DomainError> {
        let row: Option<LocationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM locations WHERE LOWER(name) = LOWER($1)",
            LOCATION_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("finding location by name", e))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, location: &Location) -> Result<Location, DomainError> {
        let row: LocationRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO locations (id, name, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(location.id)
        .bind(&location.name)
        .bind(&location.description)
        .bind(location.is_active)
        .bind(location.created_at)
        .bind(location.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error("creating location", location, e))?;

        Ok(row.into())
    }

    async fn update(&self, location: &Location) -> Result<Location, DomainError> {
        let row: Option<LocationRow> = sqlx::query_as(&format!(
            r#"
            UPDATE locations SET name = $2, description = $3, is_active = $4, updated_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(location.id)
        .bind(&location.name)
        .bind(&location.description)
        .bind(location.is_active)
        .bind(location.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error("updating location", location, e))?;

        row.map(Into::into).ok_or(DomainError::LocationNotFound)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("deleting location", e))?;

        Ok(result.rows_affected() > 0)
    }
}
