//! Connection pool seam.
//!
//! Handlers only need to know that a connection can be borrowed and handed
//! back. Production code plugs in [`crate::services::Database`]; tests plug
//! in doubles that succeed, fail, or count outstanding leases.

use async_trait::async_trait;
use service_core::error::AppError;

/// A connection on loan from a pool. Dropping the lease returns the
/// connection.
pub struct ConnectionLease {
    _connection: Box<dyn Send>,
}

impl ConnectionLease {
    pub fn new<C: Send + 'static>(connection: C) -> Self {
        Self {
            _connection: Box::new(connection),
        }
    }

    /// Hand the connection back to its pool now.
    pub fn release(self) {
        drop(self);
    }
}

impl std::fmt::Debug for ConnectionLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionLease").finish_non_exhaustive()
    }
}

#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// Borrow a live connection, or fail with `AppError::ConnectionUnavailable`.
    async fn acquire(&self) -> Result<ConnectionLease, AppError>;

    /// Cheap liveness check used by the health endpoints.
    async fn ping(&self) -> Result<(), AppError> {
        self.acquire().await.map(ConnectionLease::release)
    }
}
