//! `ElevenLabs-Signature: t=<unix seconds>,v0=<hex hmac>` verification.
//!
//! `v0` is HMAC-SHA256 keyed with the shared webhook secret over `"<t>.<raw body>"`.

use crate::error::{Error, WebhookErrorKind};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "elevenlabs-signature";

struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Option<SignatureHeader<'_>> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.trim().parse::<i64>().ok(),
            Some(("v0", value)) => signatures.push(value.trim()),
            _ => {}
        }
    }

    Some(SignatureHeader {
        timestamp: timestamp?,
        signatures,
    })
}

fn mac_for(secret: &str, timestamp: i64, body: &[u8]) -> Result<HmacSha256, Error> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| {
        warn!("Unusable webhook secret: {e}");
        Error::config()
    })?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(mac)
}

/// Header value for `body` signed at `timestamp`.
pub fn sign(secret: &str, timestamp: i64, body: &[u8]) -> Result<String, Error> {
    let signature = mac_for(secret, timestamp, body)?.finalize().into_bytes();
    Ok(format!("t={timestamp},v0={}", hex::encode(signature)))
}

/// Checks a delivery's signature header against the secret. Timestamps further than
/// `tolerance` from `now`, in either direction, are rejected.
pub fn verify(
    secret: &str,
    header: Option<&str>,
    body: &[u8],
    tolerance: Duration,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    let header = header
        .filter(|header| !header.trim().is_empty())
        .ok_or_else(|| Error::webhook(WebhookErrorKind::MissingSignature))?;

    let parsed = parse_header(header).ok_or_else(|| {
        warn!("Malformed webhook signature header");
        Error::webhook(WebhookErrorKind::InvalidSignature)
    })?;

    let age = now.timestamp().abs_diff(parsed.timestamp);
    if age > tolerance.as_secs() {
        warn!("Webhook signature timestamp is {age}s away from now");
        return Err(Error::webhook(WebhookErrorKind::TimestampExpired));
    }

    let mac = mac_for(secret, parsed.timestamp, body)?;
    let matched = parsed.signatures.iter().any(|signature| {
        hex::decode(signature)
            .map(|expected| mac.clone().verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        warn!("Webhook signature mismatch");
        Err(Error::webhook(WebhookErrorKind::InvalidSignature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};

    const SECRET: &str = "wsec_test";
    const BODY: &[u8] = br#"{"type":"post_call_transcription"}"#;
    const TOLERANCE: Duration = Duration::from_secs(1800);

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    fn kind_of(result: Result<(), Error>) -> Option<WebhookErrorKind> {
        match result.err()?.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Webhook(kind)) => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn accepts_a_fresh_valid_signature() {
        let header = sign(SECRET, now().timestamp() - 60, BODY).unwrap();
        assert!(verify(SECRET, Some(&header), BODY, TOLERANCE, now()).is_ok());
    }

    #[test]
    fn rejects_a_tampered_body() {
        let header = sign(SECRET, now().timestamp(), BODY).unwrap();
        assert_eq!(
            kind_of(verify(SECRET, Some(&header), b"{}", TOLERANCE, now())),
            Some(WebhookErrorKind::InvalidSignature)
        );
    }

    #[test]
    fn rejects_the_wrong_secret() {
        let header = sign("another_secret", now().timestamp(), BODY).unwrap();
        assert_eq!(
            kind_of(verify(SECRET, Some(&header), BODY, TOLERANCE, now())),
            Some(WebhookErrorKind::InvalidSignature)
        );
    }

    #[test]
    fn rejects_stale_timestamps() {
        let header = sign(SECRET, now().timestamp() - 1801, BODY).unwrap();
        assert_eq!(
            kind_of(verify(SECRET, Some(&header), BODY, TOLERANCE, now())),
            Some(WebhookErrorKind::TimestampExpired)
        );
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        assert_eq!(
            kind_of(verify(SECRET, None, BODY, TOLERANCE, now())),
            Some(WebhookErrorKind::MissingSignature)
        );
        assert_eq!(
            kind_of(verify(SECRET, Some("v0=abcd"), BODY, TOLERANCE, now())),
            Some(WebhookErrorKind::InvalidSignature)
        );
        assert_eq!(
            kind_of(verify(
                SECRET,
                Some(&format!("t={},v0=not-hex", now().timestamp())),
                BODY,
                TOLERANCE,
                now()
            )),
            Some(WebhookErrorKind::InvalidSignature)
        );
    }
}
