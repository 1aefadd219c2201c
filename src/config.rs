//! Environment-backed configuration

use crate::core::error::{CatalogError, CatalogResult};

/// Runtime configuration, read from environment variables at startup.
///
/// | Variable   | Default       | Meaning                      |
/// |------------|---------------|------------------------------|
/// | `APP_ENV`  | `development` | Deployment environment name  |
/// | `APP_PORT` | `3000`        | HTTP listen port             |
/// | `DB_URL`   | — (required)  | MongoDB connection string    |
/// | `DB_NAME`  | `catalog`     | Database name                |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
}

impl AppConfig {
    pub fn from_env() -> CatalogResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CatalogResult<Self> {
        let env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        let port = match lookup("APP_PORT") {
            None => 3000,
            Some(raw) => raw.parse().map_err(|_| CatalogError::Config {
                message: format!("APP_PORT must be a port number, got '{raw}'"),
            })?,
        };

        let database_url = lookup("DB_URL").ok_or_else(|| CatalogError::Config {
            message: "DB_URL is required".to_string(),
        })?;

        let database_name = lookup("DB_NAME").unwrap_or_else(|| "catalog".to_string());

        Ok(Self {
            env,
            port,
            database_url,
            database_name,
        })
    }

    pub fn is_development(&self) -> bool {
        self.env == "development"
    }
}
