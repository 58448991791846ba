use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::database::{DbPool, SchemaManager};
use crate::utils::bounded;

pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const SCHEMA_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-wide startup state. Single forward transition path; `Degraded`
/// is `Ready` with a failed database init, `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StartupState {
    Unstarted,
    PoolProbing,
    SchemaInitializing,
    Ready,
    Degraded,
    Failed,
}

/// Writer half, held only by the startup sequence in `main`.
pub struct Lifecycle {
    tx: watch::Sender<StartupState>,
}

/// Read-only view handed to components at construction; nothing reads
/// startup state through ambient globals.
#[derive(Clone)]
pub struct ReadinessHandle {
    rx: watch::Receiver<StartupState>,
}

impl ReadinessHandle {
    pub fn current(&self) -> StartupState {
        *self.rx.borrow()
    }
}

impl Lifecycle {
    pub fn new() -> (Self, ReadinessHandle) {
        let (tx, rx) = watch::channel(StartupState::Unstarted);
        (Self { tx }, ReadinessHandle { rx })
    }

    /// Move forward; backward transitions are ignored.
    pub fn advance(&self, next: StartupState) {
        self.tx.send_modify(|state| {
            if next > *state {
                debug!("Startup state {:?} -> {:?}", state, next);
                *state = next;
            }
        });
    }

    pub fn mark_serving(&self, degraded: bool) {
        if degraded {
            warn!("Serving in DEGRADED mode — database init did not complete");
            self.advance(StartupState::Degraded);
        } else {
            self.advance(StartupState::Ready);
        }
    }

    pub fn mark_failed(&self) {
        self.advance(StartupState::Failed);
    }
}

/// Startup sequence: pool probe, then schema authentication and table sync,
/// each raced against its deadline. Database trouble degrades the service
/// instead of blocking it; the return value says whether anything failed.
pub async fn run_startup(lifecycle: &Lifecycle, db: &DbPool, schema: &SchemaManager) -> bool {
    lifecycle.advance(StartupState::PoolProbing);
    db.probe().await;

    let mut degraded = false;

    match bounded(AUTH_TIMEOUT, "schema.authenticate", schema.authenticate()).await {
        Ok(Ok(())) => info!("✅ Database credentials verified"),
        Ok(Err(e)) => {
            warn!("Database authentication failed: {} — continuing anyway", e);
            degraded = true;
        }
        Err(timeout) => {
            warn!("{} — continuing anyway", timeout);
            degraded = true;
        }
    }

    lifecycle.advance(StartupState::SchemaInitializing);

    match bounded(
        SCHEMA_SYNC_TIMEOUT,
        "schema.ensure_tables_exist",
        schema.ensure_tables_exist(),
    )
    .await
    {
        Ok(Ok(_)) => info!("✅ Schema synchronized"),
        Ok(Err(e)) => {
            warn!("Schema sync failed: {} — serving with best-effort schema", e);
            degraded = true;
        }
        Err(timeout) => {
            warn!("{} — serving with best-effort schema", timeout);
            degraded = true;
        }
    }

    degraded
}

/// Resolves on SIGTERM or ctrl-c; drives axum's graceful shutdown.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install ctrl-c handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl-c received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
