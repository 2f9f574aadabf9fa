//! Slack request signing (`X-Slack-Signature`) verification.
//!
//! Slack signs `v0:{X-Slack-Request-Timestamp}:{raw body}` with HMAC-SHA256
//! under the app's signing secret and sends `v0=<hex digest>`. Requests whose
//! timestamp is more than five minutes off are rejected as replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

const VERSION: &str = "v0";
const MAX_SKEW_SECS: u64 = 60 * 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing request header: {0}")]
    MissingHeader(&'static str),

    #[error("request timestamp is invalid or outside the allowed window")]
    StaleTimestamp,

    #[error("signature verification failed")]
    Mismatch,

    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// Verify a Slack request signature.
///
/// `now` is the current Unix time in seconds. Uses constant-time comparison
/// (via the hmac crate's `verify_slice`).
pub fn verify_slack_signature(
    signing_secret: &[u8],
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::StaleTimestamp)?;
    let skew = now.checked_sub(ts).map(i64::unsigned_abs);
    if skew.is_none_or(|secs| secs > MAX_SKEW_SECS) {
        return Err(SignatureError::StaleTimestamp);
    }

    let hex = signature
        .strip_prefix("v0=")
        .ok_or(SignatureError::Mismatch)?;
    let expected = hex_decode(hex).map_err(|_| SignatureError::Mismatch)?;

    let mut mac = HmacSha256::new_from_slice(signing_secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.trim().as_bytes());
    mac.update(b":");
    mac.update(body);

    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compute the `v0=<hex>` signature for a request. Used by tests and tools.
pub fn sign(signing_secret: &[u8], timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(format!("{VERSION}:{timestamp}:").as_bytes());
    mac.update(body);
    Ok(format!("v0={}", hex_encode(&mac.finalize().into_bytes())))
}

fn hex_decode(hex: &str) -> Result<Vec<u8>, ()> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return Err(());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ()))
        .collect()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
