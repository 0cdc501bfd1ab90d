//! Configuration module for jiji-service.

use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::time::Duration;

/// Database settings that must be present before the service may start.
pub const REQUIRED_DATABASE_VARS: [&str; 5] = [
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_USER",
    "POSTGRES_DATABASE",
    "POSTGRES_PASSWORD",
];

#[derive(Debug, Clone)]
pub struct JijiConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: PostgresConfig,
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub password: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl PostgresConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.database)
    }
}

impl JijiConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_vars(common, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_vars<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_DATABASE_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::ConfigurationMissing(missing));
        }

        let required = |key: &str| {
            get(key).ok_or_else(|| AppError::ConfigurationMissing(vec![key.to_string()]))
        };

        let port = required("POSTGRES_PORT")?;
        let port = port.trim().parse::<u16>().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("POSTGRES_PORT '{}' is invalid: {}", port, e))
        })?;

        Ok(Self {
            common,
            service_name: get("SERVICE_NAME").unwrap_or_else(|| "jiji-service".to_string()),
            service_version: get("SERVICE_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            otlp_endpoint: get("OTLP_ENDPOINT"),
            database: PostgresConfig {
                host: required("POSTGRES_HOST")?,
                port,
                user: required("POSTGRES_USER")?,
                database: required("POSTGRES_DATABASE")?,
                password: Secret::new(required("POSTGRES_PASSWORD")?),
                max_connections: get("DATABASE_MAX_CONNECTIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                min_connections: get("DATABASE_MIN_CONNECTIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
                acquire_timeout: Duration::from_secs(
                    get("DATABASE_ACQUIRE_TIMEOUT_SECS")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(5),
                ),
            },
        })
    }
}
