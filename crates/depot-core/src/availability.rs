//! Datastore availability
//!
//! One [`DatastoreStatus`] is built at startup and shared through the HTTP
//! state. Handlers read the last known state; the admin sync operation and
//! startup refresh it through the injected [`HealthProbe`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns `true` when the datastore answers a trivial query.
    async fn ping(&self) -> bool;
}

pub struct DatastoreStatus {
    available: AtomicBool,
    probe: Arc<dyn HealthProbe>,
}

impl DatastoreStatus {
    /// Starts as unavailable until the first [`refresh`](Self::refresh).
    pub fn new(probe: Arc<dyn HealthProbe>) -> Self {
        Self {
            available: AtomicBool::new(false),
            probe,
        }
    }

    pub async fn refresh(&self) -> bool {
        let available = self.probe.ping().await;
        let previous = self.available.swap(available, Ordering::SeqCst);
        if previous != available {
            if available {
                info!("Datastore connection available");
            } else {
                warn!("Datastore connection lost");
            }
        }
        available
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn ensure_available(&self) -> Result<(), DomainError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(DomainError::DatastoreUnavailable)
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_available() {
            "connected"
        } else {
            "disconnected"
        }
    }
}
