use axum::{body::Bytes, http::HeaderMap, http::StatusCode};
use tracing::info;

/// Payment-provider webhook intake.
///
/// The body arrives as the raw signed bytes — this path is exempt from JSON
/// parsing and from response encryption, because the producer signs the
/// untransformed payload and expects a plain acknowledgment. Signature
/// verification and the provider-specific event handling live with the
/// billing collaborator.
pub async fn receive(headers: HeaderMap, body: Bytes) -> StatusCode {
    info!(
        bytes = body.len(),
        signed = headers.contains_key("x-signature"),
        "Webhook payload received"
    );
    StatusCode::OK
}
