//! Startup errors raised while assembling the configuration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
}
