// common/src/token.rs
//! Best-effort introspection of backend-issued bearer tokens.
//!
//! Nothing in here verifies a signature. Decoding only peeks at the payload
//! so the proxy can skip a backend round-trip for a token that has already
//! expired; the backend remains the authority on whether a token is genuine.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Characters of a token shown by [`preview`]
const PREVIEW_CHARS: usize = 30;

/// Claims peeked from a bearer token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,
    /// Expiry (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Who the token was issued to: `userId`, else `id`, else `sub`
    pub fn subject(&self) -> Option<&Value> {
        self.user_id
            .as_ref()
            .or_else(|| self.extra.get("id"))
            .or_else(|| self.extra.get("sub"))
            .filter(|v| !v.is_null())
    }

    /// `exp` when present, non-zero and representable as a timestamp
    fn expiry(&self) -> Option<DateTime<Utc>> {
        let exp = self.exp.filter(|exp| *exp != 0.0 && exp.is_finite())?;
        let millis = exp * 1000.0;
        if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
            return None;
        }
        Utc.timestamp_millis_opt(millis as i64).single()
    }
}

/// Decode the payload segment of `token` without verifying it
pub fn decode(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() || header.is_empty() || payload.is_empty() {
        return None;
    }

    // The header has to look like a JOSE header even though we never use it
    decode_segment(header)?.as_object()?;

    let payload = decode_segment(payload)?;
    if !payload.is_object() {
        return None;
    }

    serde_json::from_value(payload).ok()
}

fn decode_segment(segment: &str) -> Option<Value> {
    let bytes = base64::decode_config(segment.trim_end_matches('='), base64::URL_SAFE_NO_PAD).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Fail-closed expiry check against the current time
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// `true` unless `token` decodes, carries an `exp`, and `exp` is not before `now`
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode(token).as_ref().and_then(TokenClaims::expiry) {
        Some(expiry) => expiry.timestamp_millis() < now.timestamp_millis(),
        None => true,
    }
}

/// Expiry of `token`, or `None` when it cannot be decoded or has no `exp`
pub fn expiry_time(token: &str) -> Option<DateTime<Utc>> {
    decode(token)?.expiry()
}

/// Loggable prefix of a token
pub fn preview(token: &str) -> String {
    let visible: String = token.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", visible)
}
