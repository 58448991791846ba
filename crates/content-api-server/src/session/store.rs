use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::utils::ApiError;

const SESSION_TTL_HOURS: i64 = 24;

/// One authenticated-or-anonymous session row.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub data: Value,
    pub expire: DateTime<Utc>,
}

/// Database-backed session persistence.
///
/// Sessions are never held only in process memory: a restart must not
/// invalidate active cookies, so every read and write goes to the
/// `session` table.
#[derive(Clone)]
pub struct SessionStore {
    pool: PgPool,
}

fn fresh_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::hours(SESSION_TTL_HOURS)
}

impl SessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a session by id. Expired rows are swept on read.
    pub async fn load(&self, sid: &str) -> Result<Option<Session>, ApiError> {
        let row: Option<(Value, DateTime<Utc>)> =
            sqlx::query_as(r#"SELECT "sess", "expire" FROM "session" WHERE "sid" = $1"#)
                .bind(sid)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((data, expire)) if expire > Utc::now() => Ok(Some(Session {
                id: sid.to_string(),
                data,
                expire,
            })),
            Some(_) => {
                debug!("Sweeping expired session {}", sid);
                self.destroy(sid).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Create and persist a fresh anonymous session.
    pub async fn create(&self) -> Result<Session, ApiError> {
        let id = Uuid::new_v4().simple().to_string();
        let data = json!({});
        let expire = fresh_expiry();

        sqlx::query(r#"INSERT INTO "session" ("sid", "sess", "expire") VALUES ($1, $2, $3)"#)
            .bind(&id)
            .bind(&data)
            .bind(expire)
            .execute(&self.pool)
            .await?;

        debug!("Created session {}", id);
        Ok(Session { id, data, expire })
    }

    /// Reset the sliding 24h expiry.
    pub async fn touch(&self, sid: &str) -> Result<(), ApiError> {
        sqlx::query(r#"UPDATE "session" SET "expire" = $2 WHERE "sid" = $1"#)
            .bind(sid)
            .bind(fresh_expiry())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Merge a key/value pair into the session payload.
    pub async fn set_value(&self, sid: &str, key: &str, value: Value) -> Result<(), ApiError> {
        sqlx::query(r#"UPDATE "session" SET "sess" = "sess" || $2 WHERE "sid" = $1"#)
            .bind(sid)
            .bind(json!({ key: value }))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop the row entirely (logout, expiry sweep).
    pub async fn destroy(&self, sid: &str) -> Result<(), ApiError> {
        sqlx::query(r#"DELETE FROM "session" WHERE "sid" = $1"#)
            .bind(sid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
