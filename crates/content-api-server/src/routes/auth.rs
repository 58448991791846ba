use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::session::CurrentSession;
use crate::state::AppState;
use crate::utils::ApiError;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Credential verification belongs to the auth collaborator; the pipeline
/// contract exercised here is the session mutation it performs.
async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .sessions
        .set_value(&session.id, "user_email", json!(req.email))
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Logout destroys the session row; the stale cookie no longer resolves.
async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Result<StatusCode, ApiError> {
    state.sessions.destroy(&session.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(Extension(session): Extension<CurrentSession>) -> Json<Value> {
    Json(session.data)
}
