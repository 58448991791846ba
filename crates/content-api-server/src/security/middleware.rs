use axum::{
    extract::{ConnectInfo, Request, State},
    http::header::USER_AGENT,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::warn;

use crate::security::{path_filter, user_agent};
use crate::state::AppState;
use crate::utils::ApiError;

/// Stateless request inspectors, fixed order: user-agent, suspicious path,
/// rate limit. Runs before any session or encryption work so junk traffic
/// is shed cheaply.
pub async fn security_filters(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(ua) = req.headers().get(USER_AGENT).and_then(|v| v.to_str().ok()) {
        if user_agent::is_blocked(ua) {
            warn!("Blocked user agent: {}", ua);
            return Err(ApiError::Forbidden);
        }
    }

    let decoded = path_filter::decode(req.uri().path());
    if path_filter::is_suspicious(&decoded) {
        warn!("Blocked suspicious path: {}", decoded);
        return Err(ApiError::Forbidden);
    }

    let identity = client_identity(&req);
    if !state.limiter.check(&identity) {
        warn!("Rate limit exceeded for {}", identity);
        return Err(ApiError::RateLimited);
    }

    Ok(next.run(req).await)
}

/// Client identity for rate limiting: first hop of `X-Forwarded-For` when a
/// trusted proxy fronts us, otherwise the socket address.
fn client_identity(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        let forwarded = forwarded.trim();
        if !forwarded.is_empty() {
            return forwarded.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
