use anyhow::{anyhow, Result};
use base64::Engine;
use serde::Deserialize;

/// Registered claims this service cares about. The payload is decoded,
/// never re-encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtClaims {
    pub exp: u64, // UNIX seconds
    #[serde(default)]
    pub iat: Option<u64>,
}

/// Decode the payload segment of a signed token (header.payload.signature).
/// The signature is not verified here; the provider owns verification.
pub fn decode_claims(token_value: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token_value.split('.').collect();
    if parts.len() != 3 {
        return Err(anyhow!("invalid JWT format"));
    }

    let payload = parts[1];
    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    serde_json::from_slice::<JwtClaims>(&decoded)
        .map_err(|e| anyhow!("invalid JWT payload: {}", e))
}
