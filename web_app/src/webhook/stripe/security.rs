//! Signature verification of Stripe webhook requests
//!
//! Stripe signs every event with the endpoint secret. The `Stripe-Signature`
//! header carries a timestamp and one or more signatures:
//! `t=1492774577,v1=5257a869...,v1=...`
//!
//! The signed payload is `"{t}.{raw body}"` hashed with HMAC-SHA256. Events
//! older than the tolerance are rejected to limit replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_signature_header(header: &str) -> Option<SignatureHeader<'_>> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for (key, value) in header.split(',').filter_map(|part| part.trim().split_once('=')) {
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    Some(SignatureHeader {
        timestamp: timestamp?,
        signatures,
    })
}

/// HMAC-SHA256 of `"{timestamp}.{payload}"`
fn compute_signature(timestamp: i64, payload: &[u8], secret: &str) -> Option<Vec<u8>> {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return None;
        }
    };

    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    Some(mac.finalize().into_bytes().to_vec())
}

/// Verifies the `Stripe-Signature` header against the raw request body.
///
/// `now` is the current unix time in seconds. Returns `false` for a malformed
/// header, a stale timestamp or when no `v1` signature matches.
pub fn verify_signature(
    signature_header: &str,
    payload: &[u8],
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> bool {
    let Some(header) = parse_signature_header(signature_header) else {
        logfire::warn!("Invalid Stripe-Signature header: missing timestamp");
        return false;
    };

    if now.abs_diff(header.timestamp) > tolerance_secs.unsigned_abs() {
        logfire::warn!(
            "Stripe webhook timestamp outside tolerance: {timestamp}",
            timestamp = header.timestamp
        );
        return false;
    }

    let Some(computed) = compute_signature(header.timestamp, payload, secret) else {
        return false;
    };

    let is_valid = header
        .signatures
        .iter()
        .filter_map(|signature| hex::decode(signature).ok())
        .any(|expected| bool::from(computed.ct_eq(&expected)));

    if !is_valid {
        logfire::warn!("Stripe webhook signature verification failed: signatures do not match");
    }

    is_valid
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;

    fn sign(timestamp: i64, payload: &[u8], secret: &str) -> String {
        hex::encode(compute_signature(timestamp, payload, secret).unwrap())
    }

    #[test]
    fn test_verify_signature_valid() {
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let header = format!("t={},v1={}", NOW, sign(NOW, payload, SECRET));

        assert!(verify_signature(&header, payload, SECRET, 300, NOW + 10));
    }

    #[test]
    fn test_verify_signature_any_v1_matches() {
        let payload = b"{}";
        let header = format!(
            "t={},v1={},v1={},v0=ignored",
            NOW,
            "00".repeat(32),
            sign(NOW, payload, SECRET)
        );

        assert!(verify_signature(&header, payload, SECRET, 300, NOW));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let payload = b"{}";
        let header = format!("t={},v1={}", NOW, sign(NOW, payload, "whsec_other"));

        assert!(!verify_signature(&header, payload, SECRET, 300, NOW));
    }

    #[test]
    fn test_verify_signature_tampered_payload() {
        let header = format!("t={},v1={}", NOW, sign(NOW, b"{\"a\":1}", SECRET));

        assert!(!verify_signature(&header, b"{\"a\":2}", SECRET, 300, NOW));
    }

    #[test]
    fn test_verify_signature_stale_timestamp() {
        let payload = b"{}";
        let header = format!("t={},v1={}", NOW, sign(NOW, payload, SECRET));

        assert!(!verify_signature(&header, payload, SECRET, 300, NOW + 301));
    }

    #[test]
    fn test_verify_signature_extreme_timestamps() {
        let payload = b"{}";
        for timestamp in [i64::MIN, i64::MAX] {
            let header = format!("t={timestamp},v1={}", "00".repeat(32));
            assert!(!verify_signature(&header, payload, SECRET, 300, NOW));
        }

        let header = format!("t={NOW},v1={}", sign(NOW, payload, SECRET));
        assert!(!verify_signature(&header, payload, SECRET, 300, i64::MIN));
        assert!(!verify_signature(&header, payload, SECRET, 300, i64::MAX));
    }

    #[test]
    fn test_verify_signature_malformed_header() {
        assert!(!verify_signature("", b"{}", SECRET, 300, NOW));
        assert!(!verify_signature("v1=abcd", b"{}", SECRET, 300, NOW));
        assert!(!verify_signature("t=abc,v1=abcd", b"{}", SECRET, 300, NOW));
        assert!(!verify_signature(&format!("t={NOW},v1=zz"), b"{}", SECRET, 300, NOW));
    }
}
