use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::Settings;
use crate::utils::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed cookie name used for session lookups.
pub const SESSION_COOKIE: &str = "sid";

const MAX_AGE_SECONDS: u64 = 24 * 60 * 60;

fn sign(id: &str, secret: &str) -> Result<String, ApiError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::InternalError(format!("HMAC error: {}", e)))?;
    mac.update(id.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// Cookie value: `<id>.<base64url hmac-sha256(id, secret)>`.
pub fn encode(id: &str, secret: &str) -> Result<String, ApiError> {
    Ok(format!("{}.{}", id, sign(id, secret)?))
}

/// Extract and verify the session id from the request's `sid` cookie.
/// Returns `None` for absent, unparseable, or tampered cookies.
pub fn verified_sid(headers: &HeaderMap, secret: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    let value = raw
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("sid="))?;

    let (id, signature) = value.rsplit_once('.')?;
    let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(id.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(id.to_string())
}

/// Build the `Set-Cookie` header for a fresh session.
/// `Secure` only in production, `SameSite=Lax` always.
pub fn build_set_cookie(id: &str, settings: &Settings) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        encode(id, &settings.session_secret)?,
        MAX_AGE_SECONDS
    );
    if settings.is_production() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("invalid cookie header: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn settings(node_env: &str) -> Settings {
        Settings {
            frontend_url: "http://localhost:5173".into(),
            postgres_url: "postgres://localhost/app".into(),
            session_secret: SECRET.into(),
            node_env: node_env.into(),
            port: 3001,
        }
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn signed_cookie_round_trips() {
        let value = encode("abc123", SECRET).unwrap();
        let headers = headers_with_cookie(&format!("sid={}", value));
        assert_eq!(verified_sid(&headers, SECRET).as_deref(), Some("abc123"));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let value = encode("abc123", SECRET).unwrap();
        let headers = headers_with_cookie(&format!("sid={}x", value));
        assert_eq!(verified_sid(&headers, SECRET), None);
    }

    #[test]
    fn forged_id_is_rejected() {
        let value = encode("abc123", SECRET).unwrap();
        let (_, sig) = value.rsplit_once('.').unwrap();
        let headers = headers_with_cookie(&format!("sid=other.{}", sig));
        assert_eq!(verified_sid(&headers, SECRET), None);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let value = encode("abc123", "another-secret").unwrap();
        let headers = headers_with_cookie(&format!("sid={}", value));
        assert_eq!(verified_sid(&headers, SECRET), None);
    }

    #[test]
    fn cookie_found_among_other_cookies() {
        let value = encode("abc123", SECRET).unwrap();
        let headers = headers_with_cookie(&format!("theme=dark; sid={}; lang=pt", value));
        assert_eq!(verified_sid(&headers, SECRET).as_deref(), Some("abc123"));
    }

    #[test]
    fn absent_cookie_yields_none() {
        assert_eq!(verified_sid(&HeaderMap::new(), SECRET), None);
    }

    #[test]
    fn set_cookie_carries_required_attributes() {
        let header = build_set_cookie("abc123", &settings("development")).unwrap();
        let value = header.to_str().unwrap();
        assert!(value.starts_with("sid=abc123."));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=86400"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn secure_attribute_only_in_production() {
        let header = build_set_cookie("abc123", &settings("production")).unwrap();
        assert!(header.to_str().unwrap().contains("Secure"));
    }
}
