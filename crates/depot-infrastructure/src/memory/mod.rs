//! In-process adapters
//!
//! Same port contracts as the PostgreSQL adapters, backed by maps behind a
//! `tokio::sync::RwLock`. Used by the HTTP tests and for running the server
//! without a database.

mod location_repo;
mod product_repo;
mod support;
mod user_repo;

pub use location_repo::MemoryLocationRepository;
pub use product_repo::MemoryProductRepository;
pub use support::{MemoryBackupStore, NoopSchemaManager, StaticHealthProbe};
pub use user_repo::MemoryUserRepository;

use depot_shared::types::{Page, PageRequest};

pub(crate) fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let window = items
        .iter()
        .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
        .take(request.limit as usize)
        .cloned()
        .collect();
    Page::new(window, total, request)
}
