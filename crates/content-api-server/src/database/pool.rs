use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use tracing::{info, warn};

use crate::utils::ApiError;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded PostgreSQL connection pool.
///
/// Connects lazily so construction never blocks on the network; the pool may
/// shrink to zero when idle and idle connections past the timeout are
/// reclaimed.
#[derive(Clone)]
pub struct DbPool {
    pool: PgPool,
    closed: Arc<AtomicBool>,
}

impl DbPool {
    pub fn new(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(IDLE_TIMEOUT)
            .connect_lazy(url)?;

        Ok(Self {
            pool,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Lease a connection. Fails with `PoolExhausted` once the acquire
    /// timeout elapses; the lease returns to the idle set on drop.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, ApiError> {
        Ok(self.pool.acquire().await?)
    }

    /// Startup smoke test: one acquire/release round-trip, bounded by the
    /// pool's own acquire timeout. Logs the outcome either way and never
    /// takes the process down.
    pub async fn probe(&self) {
        match self.acquire().await {
            Ok(conn) => {
                drop(conn);
                info!("✅ Database connection established");
            }
            Err(e) => warn!("Database probe failed: {}", e),
        }
    }

    /// Wait for leased connections to come back, then close the idle set.
    /// Idempotent — a second termination signal must not double-close.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.pool.close().await;
        info!("Connection pool closed");
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn close_is_idempotent() {
        let db = DbPool::new("postgres://localhost:5432/unreachable").unwrap();
        db.close().await;
        db.close().await;
        assert!(db.pool().is_closed());
    }

    #[tokio::test]
    async fn acquire_on_closed_pool_is_a_request_error_not_a_panic() {
        let db = DbPool::new("postgres://localhost:5432/unreachable").unwrap();
        db.close().await;
        assert!(db.acquire().await.is_err());
    }
}
