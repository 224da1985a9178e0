//! Shared application state

use std::sync::Arc;

use depot_core::availability::{DatastoreStatus, HealthProbe};
use depot_core::repositories::{BackupStore, LocationRepository, ProductRepository, SchemaManager, UserRepository};
use depot_core::services::{
    AccessService, AuthService, LocationService, MaintenanceService, ProductService, UserService,
};
use depot_security::JwtService;
use depot_shared::config::AppConfig;

/// Port implementations the server runs on.
pub struct Adapters {
    pub users: Arc<dyn UserRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub schema: Arc<dyn SchemaManager>,
    pub backups: Arc<dyn BackupStore>,
    pub probe: Arc<dyn HealthProbe>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub datastore: Arc<DatastoreStatus>,
    pub access: Arc<AccessService>,
    pub auth: Arc<AuthService>,
    pub products: Arc<ProductService>,
    pub locations: Arc<LocationService>,
    pub users: Arc<UserService>,
    pub maintenance: Arc<MaintenanceService>,
}

impl AppState {
    /// Wires services over the adapters. The datastore starts out
    /// unavailable until [`DatastoreStatus::refresh`] is called.
    pub fn new(config: AppConfig, adapters: Adapters) -> Self {
        let jwt = Arc::new(JwtService::from_hours(
            &config.jwt.secret,
            config.jwt.token_expiry_hours,
        ));
        let datastore = Arc::new(DatastoreStatus::new(adapters.probe));

        Self {
            access: Arc::new(AccessService::new(
                adapters.users.clone(),
                jwt.clone(),
                datastore.clone(),
            )),
            auth: Arc::new(AuthService::new(adapters.users.clone(), jwt)),
            products: Arc::new(ProductService::new(
                adapters.products.clone(),
                adapters.users.clone(),
            )),
            locations: Arc::new(LocationService::new(adapters.locations.clone())),
            users: Arc::new(UserService::new(adapters.users.clone())),
            maintenance: Arc::new(MaintenanceService::new(
                adapters.users,
                adapters.locations,
                adapters.products,
                adapters.schema,
                adapters.backups,
                datastore.clone(),
            )),
            datastore,
            config: Arc::new(config),
        }
    }
}
