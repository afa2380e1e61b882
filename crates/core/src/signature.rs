//! HMAC-SHA256 webhook payload signing and verification.
//!
//! Signatures are transported in a composite header value of the form
//! `t=<epoch-ms>,v1=<hex-hmac>`. The timestamp is part of the signed
//! material (`"<t>.<body>"`), so an attacker cannot replay an old
//! body+signature pair outside the verification tolerance window.
//! Verification compares digests in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default replay-protection window for [`verify`] (5 minutes).
pub const DEFAULT_TOLERANCE_MS: i64 = 300_000;

/// Sign a payload body with a webhook secret.
///
/// Captures the current wall-clock time and returns the composite header
/// value. Re-signing the same body later produces a different value
/// because the embedded timestamp changes; the body itself must not.
pub fn sign(body: &str, secret: &str) -> String {
    sign_at(body, secret, now_ms())
}

/// Verify a composite signature header against a payload body.
///
/// Returns `true` only if the header parses, the embedded timestamp is
/// within `tolerance_ms` of the current time, and the recomputed HMAC
/// matches the transported digest exactly.
pub fn verify(body: &str, header: &str, secret: &str, tolerance_ms: i64) -> bool {
    verify_at(body, header, secret, tolerance_ms, now_ms())
}

fn sign_at(body: &str, secret: &str, timestamp_ms: i64) -> String {
    let digest = compute_hmac(secret, &format!("{timestamp_ms}.{body}"));
    format!("t={timestamp_ms},v1={digest}")
}

fn verify_at(body: &str, header: &str, secret: &str, tolerance_ms: i64, now_ms: i64) -> bool {
    let Some((timestamp_ms, digest_hex)) = parse_header(header) else {
        return false;
    };

    if (now_ms - timestamp_ms).abs() > tolerance_ms {
        return false;
    }

    let Ok(digest) = hex::decode(digest_hex) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(format!("{timestamp_ms}.{body}").as_bytes());
    // Constant-time comparison on secret-derived material.
    mac.verify_slice(&digest).is_ok()
}

/// Parse `t=<ms>,v1=<hex>` into its timestamp and digest parts.
///
/// Both parts must be present; order and unknown extra parts are
/// tolerated so the scheme can grow a `v2` later.
fn parse_header(header: &str) -> Option<(i64, &str)> {
    let mut timestamp_ms: Option<i64> = None;
    let mut digest: Option<&str> = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp_ms = value.parse().ok(),
            Some(("v1", value)) => digest = Some(value),
            _ => {}
        }
    }

    Some((timestamp_ms?, digest?))
}

/// Compute the hex-encoded HMAC-SHA256 of `message` under `secret`.
pub fn compute_hmac(secret: &str, message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
