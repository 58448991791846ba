use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::error;

use crate::state::AppState;
use crate::utils::ApiError;

const NONCE_LEN: usize = 12;

/// AES-256-GCM transform for outbound response bodies.
///
/// Key is SHA-256 of the shared secret; every response gets a fresh random
/// nonce, shipped in front of the ciphertext inside the envelope.
pub struct ResponseCipher {
    cipher: Aes256Gcm,
}

impl ResponseCipher {
    pub fn new(secret: &str) -> Self {
        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new(&key);
        Self { cipher }
    }

    /// Encrypt a serialized body into the transport form:
    /// `base64(nonce || ciphertext)`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, ApiError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| ApiError::EncryptionFailure)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    /// Inverse of `encrypt`. The platform frontend holds the matching key;
    /// kept here so the round-trip law stays checkable.
    pub fn decrypt(&self, payload: &str) -> Result<Vec<u8>, ApiError> {
        let raw = STANDARD
            .decode(payload)
            .map_err(|_| ApiError::EncryptionFailure)?;
        if raw.len() < NONCE_LEN {
            return Err(ApiError::EncryptionFailure);
        }
        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| ApiError::EncryptionFailure)
    }
}

/// Response-encryption middleware for every routed resource.
///
/// `/webhook` and `/health` are mounted outside this layer — the webhook
/// caller is a machine verifying a contract and operators read health
/// directly. Status code and headers survive; on any transform failure the
/// response fails closed as a 500 and the plaintext never leaves.
pub async fn encrypt_response(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let res = next.run(req).await;

    match seal(&state.cipher, res).await {
        Ok(sealed) => sealed,
        Err(e) => {
            error!("Failed to encrypt response body: {}", e);
            ApiError::EncryptionFailure.into_response()
        }
    }
}

async fn seal(cipher: &ResponseCipher, res: Response) -> Result<Response, ApiError> {
    let (mut parts, body) = res.into_parts();

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if bytes.is_empty() {
        return Ok(Response::from_parts(parts, Body::empty()));
    }

    let payload = cipher.encrypt(&bytes)?;
    let envelope = serde_json::to_vec(&json!({ "payload": payload }))
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    parts.headers.remove(CONTENT_LENGTH);
    parts.headers.insert(
        CONTENT_TYPE,
        axum::http::HeaderValue::from_static("application/json"),
    );

    Ok(Response::from_parts(parts, Body::from(envelope)))
}
