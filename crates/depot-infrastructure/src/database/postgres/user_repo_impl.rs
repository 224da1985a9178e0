// ============================================================================
// Depot Infrastructure - PostgreSQL User Repository
// File: crates/depot-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use depot_core::domain::{Role, User};
use depot_core::error::DomainError;
use depot_core::query::{contains_pattern, UserFilter, UserQuery};
use depot_core::repositories::{UserRepository, UserStats};
use depot_shared::types::Page;
use depot_shared::utils::mask_email;

use crate::database::error::{map_sqlx_error, unique_violation};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, last_login, created_at, updated_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role).unwrap_or_default(),
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn push_user_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    qb.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        qb.push(" AND (lower(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR lower(email) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
}

fn map_write_error(context: &str, user: &User, e: sqlx::Error) -> DomainError {
    match unique_violation(&e) {
        Some(constraint) if constraint.contains("email") => {
            DomainError::EmailAlreadyExists(user.email.clone())
        }
        _ => map_sqlx_error(context, e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("finding user by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("finding user by email", e))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        info!("Creating user with email: {}", mask_email(&user.email));

        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role, is_active, last_login, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error("creating user", user, e))?;

        Ok(row.into())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET
                name = $2,
                email = $3,
                password_hash = $4,
                role = $5,
                is_active = $6,
                last_login = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error("updating user", user, e))?;

        row.map(Into::into).ok_or(DomainError::UserNotFound)
    }

    async fn list(&self, query: &UserQuery) -> Result<Page<User>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_user_filter(&mut count, &query.filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("counting users", e))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users", USER_COLUMNS));
        push_user_filter(&mut select, &query.filter);
        select
            .push(" ORDER BY ")
            .push(query.sort.field.column())
            .push(" ")
            .push(query.sort.order.as_sql())
            .push(", id ASC LIMIT ")
            .push_bind(i64::from(query.page.limit))
            .push(" OFFSET ")
            .push_bind(query.page.offset() as i64);

        let rows: Vec<UserRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("listing users", e))?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            total.max(0) as u64,
            query.page,
        ))
    }

    async fn list_active(&self) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE is_active = TRUE ORDER BY name, id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("listing active users", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn stats(&self) -> Result<UserStats, DomainError> {
        let (total, active, admins, regular): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE is_active),
                COUNT(*) FILTER (WHERE is_active AND role = 'admin'),
                COUNT(*) FILTER (WHERE is_active AND role = 'user')
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("counting user stats", e))?;

        let total = total.max(0) as u64;
        let active = active.max(0) as u64;
        Ok(UserStats {
            total,
            active,
            inactive: total.saturating_sub(active),
            admins: admins.max(0) as u64,
            regular: regular.max(0) as u64,
        })
    }

    async fn list_all(&self) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users ORDER BY created_at, id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("exporting users", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
