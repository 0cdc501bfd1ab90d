//! Services module for jiji-service.

pub mod database;
pub mod metrics;
pub mod pool;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics, record_ask, record_pool_acquire};
pub use pool::{ConnectionLease, ConnectionPool};
