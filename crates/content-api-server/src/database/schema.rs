use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

/// Relational schema layer over the shared pool.
///
/// Owns the tables the pipeline itself needs (currently the session table).
/// Both operations are raced against a deadline by the lifecycle controller
/// and their failure is non-fatal: the service keeps serving with a
/// best-effort schema and the operator watches the logs.
#[derive(Clone)]
pub struct SchemaManager {
    pool: PgPool,
    closed: Arc<AtomicBool>,
}

const CREATE_SESSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "session" (
    "sid" varchar NOT NULL PRIMARY KEY,
    "sess" jsonb NOT NULL,
    "expire" timestamptz NOT NULL
)
"#;

const CREATE_SESSION_EXPIRE_INDEX: &str =
    r#"CREATE INDEX IF NOT EXISTS "idx_session_expire" ON "session" ("expire")"#;

impl SchemaManager {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Verify reachability and credentials with a no-op round-trip.
    pub async fn authenticate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create any missing tables. Returns whether everything is in place.
    pub async fn ensure_tables_exist(&self) -> Result<bool, sqlx::Error> {
        sqlx::query(CREATE_SESSION_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_SESSION_EXPIRE_INDEX)
            .execute(&self.pool)
            .await?;
        Ok(true)
    }

    /// Shut the schema layer down. The underlying pool is closed separately;
    /// this only marks the layer so a repeated signal is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Schema layer closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/unreachable")
            .unwrap()
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let schema = SchemaManager::new(lazy_pool());
        schema.close();
        schema.close();
        assert!(schema.is_closed());
    }
}
