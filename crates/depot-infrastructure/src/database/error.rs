//! sqlx error translation

use depot_core::error::DomainError;
use tracing::error;

/// Connectivity failures become `DatastoreUnavailable`; everything else is a
/// plain database error.
pub(crate) fn map_sqlx_error(context: &str, e: sqlx::Error) -> DomainError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            error!("Datastore unreachable while {}: {}", context, e);
            DomainError::DatastoreUnavailable
        }
        other => {
            error!("Database error while {}: {}", context, other);
            DomainError::DatabaseError(other.to_string())
        }
    }
}

/// Name of the unique constraint a statement tripped, if any.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<String> {
    e.as_database_error()
        .filter(|db| db.is_unique_violation())
        .map(|db| db.constraint().unwrap_or_default().to_string())
}
