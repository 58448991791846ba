use axum::{
    body::Body,
    extract::Request,
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::Response,
};

use crate::utils::ApiError;

/// Mirrors the upstream JSON body limit.
const BODY_LIMIT: usize = 1024 * 1024;

/// Structured body validation for every routed path.
///
/// `/webhook` is mounted outside this layer: its producer signs the raw
/// byte payload, so those bytes must reach the handler untransformed. Here
/// a JSON body is buffered and validated up front; a parse failure ends the
/// request with `MalformedBody` before any session or handler work.
pub async fn parse_json_body(req: Request, next: Next) -> Result<Response, ApiError> {
    let is_json = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    if !is_json {
        return Ok(next.run(req).await);
    }

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    if !bytes.is_empty() {
        serde_json::from_slice::<serde_json::Value>(&bytes)
            .map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    }

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}
