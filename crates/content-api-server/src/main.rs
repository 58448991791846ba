use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use content_api_server::config::Settings;
use content_api_server::database::{DbPool, SchemaManager};
use content_api_server::lifecycle::{self, Lifecycle};
use content_api_server::middleware::ResponseCipher;
use content_api_server::routes;
use content_api_server::security::RateLimiter;
use content_api_server::session::SessionStore;
use content_api_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,content_api_server=debug".to_string()),
        )
        .with_target(true)
        .json()
        .init();

    info!("🚀 Starting content platform API...");

    // Only a missing/invalid configuration or a failed port bind may kill
    // the process; database trouble degrades instead.
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("✅ Configuration loaded");

    let db = DbPool::new(&settings.postgres_url)?;
    let schema = SchemaManager::new(db.pool().clone());
    let sessions = SessionStore::new(db.pool().clone());
    let cipher = Arc::new(ResponseCipher::new(&settings.session_secret));
    let limiter = Arc::new(RateLimiter::default());

    let (lifecycle, readiness) = Lifecycle::new();

    let state = AppState {
        settings: settings.clone(),
        sessions,
        cipher,
        limiter,
        readiness,
    };

    let degraded = lifecycle::run_startup(&lifecycle, &db, &schema).await;

    let app = routes::build_router(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            lifecycle.mark_failed();
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    lifecycle.mark_serving(degraded);
    info!("🎯 Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(lifecycle::shutdown_signal())
    .await?;

    // Signal received and in-flight requests drained; close the layers in
    // order. Both closes are idempotent, so a racing second signal is safe.
    info!("Drain complete, closing database layers");
    schema.close();
    db.close().await;
    info!("Shutdown complete");

    Ok(())
}
