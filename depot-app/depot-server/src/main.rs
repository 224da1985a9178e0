use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tracing::{error, info, warn};

use depot_api::{build_router, Adapters, AppState};
use depot_core::repositories::SchemaManager;
use depot_infrastructure::{
    create_lazy_pool, FileBackupStore, PgHealthProbe, PgLocationRepository, PgProductRepository,
    PgSchemaManager, PgUserRepository,
};
use depot_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry; the guard flushes the writer on exit
    let _guard = depot_shared::telemetry::init_telemetry();

    info!("Depot server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // The pool connects on first use so the server starts without a database
    let pool = create_lazy_pool(&config.database)?;
    let schema: Arc<dyn SchemaManager> = Arc::new(PgSchemaManager::new(pool.clone()));

    let state = AppState::new(
        config.clone(),
        Adapters {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            locations: Arc::new(PgLocationRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            schema: schema.clone(),
            backups: Arc::new(FileBackupStore::new(&config.storage.backup_dir)),
            probe: Arc::new(PgHealthProbe::new(pool)),
        },
    );

    if state.datastore.refresh().await {
        info!("Database connection established.");
        if config.database.run_migrations {
            if let Err(e) = schema.sync_schema().await {
                error!("Migrations failed: {}", e);
            }
        }
        bootstrap_admin(&state, &config).await;
    } else {
        warn!("Database unreachable at startup, serving in degraded mode");
    }

    let app = build_router(state);

    // Bind address
    let host: IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {} ({})", addr, config.app.env);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Depot server stopped");
    Ok(())
}

async fn bootstrap_admin(state: &AppState, config: &AppConfig) {
    let settings = &config.bootstrap;
    let (Some(email), Some(password)) = (&settings.admin_email, &settings.admin_password) else {
        return;
    };
    let name = settings.admin_name.as_deref().unwrap_or("Administrator");

    if let Err(e) = state.users.ensure_admin(name, email, password).await {
        error!("Failed to create bootstrap administrator: {}", e);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
