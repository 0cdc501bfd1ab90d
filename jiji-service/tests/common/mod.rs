//! Common test utilities for jiji-service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use jiji_service::config::{JijiConfig, PostgresConfig};
use jiji_service::services::{ConnectionLease, ConnectionPool};
use jiji_service::startup::{build_router, AppState, Application};
use secrecy::Secret;
use service_core::config::Config as CommonConfig;
use service_core::error::AppError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use tower::ServiceExt;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,jiji_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Config pointing at a PostgreSQL port nobody listens on.
pub fn test_config() -> JijiConfig {
    JijiConfig {
        common: CommonConfig { port: 0 },
        service_name: "jiji-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: PostgresConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "jiji".to_string(),
            database: "jiji".to_string(),
            password: Secret::new("jiji".to_string()),
            max_connections: 2,
            min_connections: 0,
            acquire_timeout: Duration::from_millis(500),
        },
    }
}

/// Pool double that hands out leases and counts how many are outstanding.
#[derive(Default)]
pub struct CountingPool {
    outstanding: Arc<AtomicUsize>,
    acquired: AtomicUsize,
}

struct CountedConnection(Arc<AtomicUsize>);

impl Drop for CountedConnection {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CountingPool {
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionPool for CountingPool {
    async fn acquire(&self) -> Result<ConnectionLease, AppError> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.acquired.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent requests overlap while holding leases.
        tokio::task::yield_now().await;
        Ok(ConnectionLease::new(CountedConnection(
            self.outstanding.clone(),
        )))
    }
}

/// Pool double whose database is never reachable.
pub struct UnreachablePool;

#[async_trait]
impl ConnectionPool for UnreachablePool {
    async fn acquire(&self) -> Result<ConnectionLease, AppError> {
        Err(AppError::ConnectionUnavailable(anyhow::anyhow!(
            "connection refused (os error 111)"
        )))
    }
}

pub fn router_with(pool: Arc<dyn ConnectionPool>) -> Router {
    init_tracing();
    build_router(AppState {
        config: Arc::new(test_config()),
        pool,
    })
}

/// Build a POST to the ask endpoint with an optional identity header.
pub fn ask_request(user_id: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/ask-jiji")
        .header("content-type", "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header("x-userid", user_id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Send one request through the router and decode the JSON reply.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, body)
}

/// Running application bound to a random local port.
pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
}

impl TestApp {
    /// Spawn the real application (lazy PostgreSQL pool, unreachable database).
    pub async fn spawn() -> Self {
        init_tracing();
        let app = Application::build(test_config())
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    /// Spawn the application around an injected pool.
    pub async fn spawn_with_pool(pool: Arc<dyn ConnectionPool>) -> Self {
        init_tracing();
        let app = Application::build_with_pool(test_config(), pool)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the listener to accept by polling the metrics endpoint
        let client = reqwest::Client::new();
        let metrics_url = format!("{}/metrics", http_address);
        for _ in 0..50 {
            if client.get(&metrics_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            http_address,
            http_port,
        }
    }

    pub fn ask_url(&self) -> String {
        format!("{}/api/v1/ask-jiji", self.http_address)
    }
}
