//! Local inspection of the stored JWT.
//!
//! The payload is decoded without verifying the signature. This only lets the
//! client skip requests that are bound to fail; the backend remains the one
//! that decides whether a token is trusted.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Deserializer};

/// Outcome of inspecting a stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Decodes and is not past its `exp` (or carries none).
    Valid,
    /// `exp` lies in the past or is null.
    Expired,
    /// Not a decodable JWT.
    Malformed,
}

/// The registered claims the client looks at.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default, deserialize_with = "expiry")]
    exp: Expiry,
}

/// The `exp` claim, keeping an explicit null apart from a missing claim.
#[derive(Debug, Default)]
enum Expiry {
    #[default]
    Absent,
    Null,
    /// Seconds since the Unix epoch.
    At(f64),
}

fn expiry<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Expiry, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(Expiry::Null, Expiry::At))
}

/// Inspect a token against the current time.
#[must_use]
pub fn inspect(token: &str) -> TokenState {
    inspect_at(token, chrono::Utc::now().timestamp_millis())
}

/// Inspect a token against `now_millis` (milliseconds since the Unix epoch).
///
/// A token is expired when `exp` is strictly earlier than now, or is null. A
/// token without an `exp` claim never expires client-side.
#[must_use]
pub fn inspect_at(token: &str, now_millis: i64) -> TokenState {
    let Some(claims) = decode_claims(token) else {
        return TokenState::Malformed;
    };

    #[allow(clippy::cast_precision_loss)] // millisecond timestamps fit well within f64 precision
    let now_secs = now_millis as f64 / 1000.0;

    match claims.exp {
        Expiry::Null => TokenState::Expired,
        Expiry::At(exp) if exp < now_secs => TokenState::Expired,
        Expiry::At(_) | Expiry::Absent => TokenState::Valid,
    }
}

/// Decode the payload segment of a compact JWT.
fn decode_claims(token: &str) -> Option<Claims> {
    let mut segments = token.trim().split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    // The header has to decode too, otherwise this is not a JWT.
    let header = URL_SAFE_NO_PAD.decode(header.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&header).ok()?;

    let payload = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&payload).ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an unsigned test token with the given payload.
    pub(crate) fn make_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }

    const NOW_MILLIS: i64 = 1_760_000_000_000;

    #[test]
    fn test_future_exp_is_valid() {
        let token = make_token(&serde_json::json!({"sub": "u1", "exp": 1_760_000_600}));
        assert_eq!(inspect_at(&token, NOW_MILLIS), TokenState::Valid);
    }

    #[test]
    fn test_past_exp_is_expired() {
        let token = make_token(&serde_json::json!({"sub": "u1", "exp": 1_759_999_999}));
        assert_eq!(inspect_at(&token, NOW_MILLIS), TokenState::Expired);
    }

    #[test]
    fn test_exp_equal_to_now_is_not_expired() {
        let token = make_token(&serde_json::json!({"exp": 1_760_000_000}));
        assert_eq!(inspect_at(&token, NOW_MILLIS), TokenState::Valid);
    }

    #[test]
    fn test_missing_exp_is_valid() {
        let token = make_token(&serde_json::json!({"sub": "u1"}));
        assert_eq!(inspect_at(&token, NOW_MILLIS), TokenState::Valid);
    }

    #[test]
    fn test_null_exp_is_expired() {
        let token = make_token(&serde_json::json!({"sub": "u1", "exp": null}));
        assert_eq!(inspect_at(&token, NOW_MILLIS), TokenState::Expired);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(inspect_at("not-a-jwt", NOW_MILLIS), TokenState::Malformed);
        assert_eq!(inspect_at("a.b.c", NOW_MILLIS), TokenState::Malformed);
        assert_eq!(inspect_at("", NOW_MILLIS), TokenState::Malformed);
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD.encode(b"\"just a string\"");
        let token = format!("{header}.{payload}.");
        assert_eq!(inspect_at(&token, NOW_MILLIS), TokenState::Malformed);
    }

    #[test]
    fn test_padded_segments_are_accepted() {
        let token = make_token(&serde_json::json!({"exp": 1_760_000_600}));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1].push_str("==");
        assert_eq!(inspect_at(&parts.join("."), NOW_MILLIS), TokenState::Valid);
    }
}
