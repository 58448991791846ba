use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::session::cookie;
use crate::state::AppState;
use crate::utils::ApiError;

/// Session state attached to every routed request.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub data: Value,
}

/// Attach-or-create middleware.
///
/// A valid signed cookie resolves to its database row and resets the
/// sliding expiry; anything else (no cookie, bad signature, expired or
/// missing row) gets a fresh persisted session and a `Set-Cookie` on the
/// way out.
pub async fn attach_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = cookie::verified_sid(req.headers(), &state.settings.session_secret);

    let (session, fresh) = match presented {
        Some(sid) => match state.sessions.load(&sid).await? {
            Some(session) => {
                state.sessions.touch(&session.id).await?;
                (session, false)
            }
            None => (state.sessions.create().await?, true),
        },
        None => (state.sessions.create().await?, true),
    };

    req.extensions_mut().insert(CurrentSession {
        id: session.id.clone(),
        data: session.data.clone(),
    });

    let mut res = next.run(req).await;

    if fresh {
        res.headers_mut()
            .append(SET_COOKIE, cookie::build_set_cookie(&session.id, &state.settings)?);
    }

    Ok(res)
}
