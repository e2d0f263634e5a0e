//! JWT expiry inspection.
//!
//! Tokens are decoded WITHOUT signature verification. The accounts service
//! is the authority on authenticity; this module only reads the `exp` claim
//! to decide whether a cached token is still worth presenting.

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::helpers::time::now;

/// base64url, padding optional on decode
const JWT_SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const EXP_CLAIM: &str = "exp";

/// Check the token against the current UTC time.
pub fn is_token_valid(token: &str) -> bool {
    is_token_valid_at(token, now())
}

/// Valid iff the token decodes and `now` is strictly before its expiry.
pub fn is_token_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    if token.is_empty() {
        return false;
    }
    match expires_at(token) {
        Some(exp) => now < exp,
        None => {
            debug!("JWT is malformed or carries no exp claim");
            false
        }
    }
}

/// Reads the `exp` claim of an unverified JWT.
///
/// Returns `None` when the token does not have exactly three segments, when
/// the header or claims segment is not a base64url encoded JSON object, or
/// when `exp` is absent or not numeric. Fractional seconds are truncated.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let mut segments = token.split('.');
    let (Some(header), Some(claims), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    decode_segment(header)?;
    let claims = decode_segment(claims)?;
    let exp = claims.get(EXP_CLAIM)?.as_f64()?;

    DateTime::from_timestamp(exp.trunc() as i64, 0)
}

fn decode_segment(segment: &str) -> Option<Map<String, Value>> {
    let decoded = JWT_SEGMENT.decode(segment).ok()?;
    serde_json::from_slice(&decoded).ok()
}
