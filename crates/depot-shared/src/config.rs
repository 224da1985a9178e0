//! Configuration management

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::DEFAULT_TOKEN_EXPIRY_HOURS;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub bootstrap: BootstrapSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret: String,
    pub token_expiry_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub uploads_dir: String,
    pub backup_dir: String,
}

/// Administrator account created at startup when no account with
/// `admin_email` exists yet. Skipped unless email and password are set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapSettings {
    pub admin_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl AppSettings {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", env.as_str())?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 5000)?
            .set_default("app.name", "depot-server")?
            .set_default("database.url", "postgres://localhost/depot")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 0)?
            .set_default("database.acquire_timeout_seconds", 3)?
            .set_default("database.run_migrations", true)?
            .set_default("jwt.token_expiry_hours", DEFAULT_TOKEN_EXPIRY_HOURS)?
            .set_default("storage.uploads_dir", "uploads")?
            .set_default("storage.backup_dir", "backups")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("app.cors_origins"),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(AppError::MissingConfig("jwt.secret"));
        }
        if self.jwt.token_expiry_hours <= 0 {
            return Err(AppError::InvalidConfig {
                key: "jwt.token_expiry_hours",
                reason: "must be positive".to_string(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(AppError::InvalidConfig {
                key: "database.max_connections",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
