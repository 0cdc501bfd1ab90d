//! PostgreSQL pool for jiji-service.

use crate::config::PostgresConfig;
use crate::services::metrics::record_pool_acquire;
use crate::services::pool::{ConnectionLease, ConnectionPool};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create the pool without opening a connection. Connections are
    /// established on first acquire, so the service starts even while the
    /// database is still coming up.
    #[instrument(skip(config), fields(service = "jiji-service"))]
    pub fn connect_lazy(config: &PostgresConfig) -> Self {
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            acquire_timeout_secs = config.acquire_timeout.as_secs(),
            "Configuring PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .connect_lazy_with(config.connect_options());

        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every connection and refuse further acquires.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}

#[async_trait]
impl ConnectionPool for Database {
    #[instrument(skip(self))]
    async fn acquire(&self) -> Result<ConnectionLease, AppError> {
        let start = Instant::now();

        match self.pool.acquire().await {
            Ok(conn) => {
                record_pool_acquire("ok", start.elapsed());
                debug!(
                    pool_size = self.pool.size(),
                    idle = self.pool.num_idle(),
                    "Acquired database connection"
                );
                Ok(ConnectionLease::new(conn))
            }
            Err(e) => {
                record_pool_acquire("error", start.elapsed());
                warn!(error = %e, "Failed to acquire database connection");
                Err(AppError::ConnectionUnavailable(anyhow::Error::new(e)))
            }
        }
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}
