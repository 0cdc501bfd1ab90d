//! Application startup and lifecycle management.

use crate::config::JijiConfig;
use crate::handlers::{ask_jiji, health_check, metrics_handler, readiness_check};
use crate::services::{init_metrics, ConnectionPool, Database};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<JijiConfig>,
    pub pool: Arc<dyn ConnectionPool>,
}

/// Build the HTTP router around the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/ask-jiji", post(ask_jiji))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
    database: Option<Database>,
}

impl Application {
    /// Build the application with a lazily connected PostgreSQL pool.
    pub async fn build(config: JijiConfig) -> Result<Self, AppError> {
        let database = Database::connect_lazy(&config.database);
        let pool: Arc<dyn ConnectionPool> = Arc::new(database.clone());
        let mut app = Self::build_with_pool(config, pool).await?;
        app.database = Some(database);
        Ok(app)
    }

    /// Build the application around an already constructed pool.
    pub async fn build_with_pool(
        config: JijiConfig,
        pool: Arc<dyn ConnectionPool>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %http_addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(http_port = http_port, "Jiji service listener bound");

        Ok(Self {
            http_port,
            http_listener,
            state: AppState {
                config: Arc::new(config),
                pool,
            },
            database: None,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// The PostgreSQL pool, when the application owns one.
    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = "jiji-service",
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.http_port,
            "Service ready to accept connections"
        );

        axum::serve(self.http_listener, router).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
