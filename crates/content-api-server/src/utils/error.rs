use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied")]
    Forbidden,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Malformed body: {0}")]
    MalformedBody(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Response encryption failed")]
    EncryptionFailure,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Security rejections render plain text; everything else gets the
        // JSON error envelope.
        let (status, error_type, message) = match self {
            ApiError::Forbidden => {
                return (StatusCode::FORBIDDEN, "Access denied.").into_response();
            }
            ApiError::RateLimited => {
                return (StatusCode::TOO_MANY_REQUESTS, "Ip bloqueado.").into_response();
            }
            ApiError::MalformedBody(msg) => {
                tracing::warn!("Malformed body: {}", msg);
                (StatusCode::BAD_REQUEST, "MalformedBody", msg)
            }
            ApiError::PoolExhausted => {
                tracing::warn!("Connection pool exhausted");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PoolExhausted",
                    "database connection pool exhausted".to_string(),
                )
            }
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError", msg)
            }
            ApiError::EncryptionFailure => {
                tracing::error!("Response encryption failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EncryptionFailure",
                    "response could not be prepared".to_string(),
                )
            }
            ApiError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "NotFound", msg)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => ApiError::PoolExhausted,
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(res: Response) -> (StatusCode, String) {
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn forbidden_renders_plain_text_403() {
        let (status, body) = body_text(ApiError::Forbidden.into_response()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Access denied.");
    }

    #[tokio::test]
    async fn rate_limited_renders_blocked_message() {
        let (status, body) = body_text(ApiError::RateLimited.into_response()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, "Ip bloqueado.");
    }

    #[tokio::test]
    async fn malformed_body_renders_json_envelope() {
        let (status, body) =
            body_text(ApiError::MalformedBody("expected value".into()).into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["error"], "MalformedBody");
    }

    #[test]
    fn pool_timeout_maps_to_pool_exhausted() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ApiError::PoolExhausted));
    }
}
