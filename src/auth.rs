//! Display-only access token decoding.
//!
//! The payload segment of the JWT is read to learn who is logged in. The
//! signature is never checked, so nothing here may be used for a trust
//! decision; the API remains the only authority on whether a token is valid.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct RawClaims {
    user_id: Option<serde_json::Value>,
    sub: Option<serde_json::Value>,
    email: Option<String>,
}

fn id_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn decode_claims(token: &str) -> Result<Claims, ApiError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ApiError::Decode("access token: not a JWT".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ApiError::decode("access token payload", e))?;
    let raw: RawClaims =
        serde_json::from_slice(&bytes).map_err(|e| ApiError::decode("access token claims", e))?;
    let user_id = raw
        .user_id
        .and_then(id_string)
        .or_else(|| raw.sub.and_then(id_string))
        .ok_or_else(|| ApiError::Decode("access token claims: no user_id".into()))?;
    Ok(Claims { user_id, email: raw.email.filter(|e| !e.is_empty()) })
}

/// `jane.doe@example.com` becomes `Jane.doe`.
pub fn display_name(email: Option<&str>) -> String {
    let local = email.and_then(|e| e.split('@').next()).unwrap_or_default();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "User".to_string(),
    }
}
