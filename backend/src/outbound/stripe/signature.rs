//! Provider webhook signature verification.
//!
//! Scheme: the `Stripe-Signature` header carries `t=<unix>,v1=<hex>` where
//! the hex digest is HMAC-SHA256 over `"{t}.{payload}"` with the endpoint
//! secret. The timestamp must fall within a tolerance window; anything
//! outside is treated as a replay.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::ports::{SignatureError, WebhookVerifier};

type HmacSha256 = Hmac<Sha256>;

/// Accepted clock skew between the signed timestamp and now.
const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

/// HMAC verifier for the provider's `t=,v1=` signature header.
pub struct StripeWebhookVerifier {
    secret: String,
    tolerance_seconds: i64,
}

impl StripeWebhookVerifier {
    /// Build a verifier with the 5-minute default tolerance.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
        }
    }

    /// Override the tolerance window (tests).
    pub fn with_tolerance_seconds(mut self, tolerance_seconds: i64) -> Self {
        self.tolerance_seconds = tolerance_seconds;
        self
    }

    fn verify_at(
        &self,
        payload: &[u8],
        header: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let parsed = parse_header(header)?;

        let age = (now.timestamp() - parsed.timestamp).abs();
        if age > self.tolerance_seconds {
            return Err(SignatureError::StaleTimestamp);
        }

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::malformed_header("unusable endpoint secret"))?;
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        // The header may carry several v1 entries during secret rotation;
        // any match passes.
        if parsed
            .signatures
            .iter()
            .any(|candidate| constant_time_eq(candidate, &expected))
        {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

impl WebhookVerifier for StripeWebhookVerifier {
    fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
        self.verify_at(payload, header, Utc::now())
    }
}

struct ParsedHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_header(header: &str) -> Result<ParsedHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for element in header.split(',') {
        match element.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    SignatureError::malformed_header("timestamp is not an integer")
                })?);
            }
            Some(("v1", value)) => signatures.push(value.to_owned()),
            // Unknown schemes (v0, test entries) are ignored.
            Some(_) => {}
            None => {
                return Err(SignatureError::malformed_header(format!(
                    "element without '=': {element:?}"
                )));
            }
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| SignatureError::malformed_header("missing t= element"))?;
    if signatures.is_empty() {
        return Err(SignatureError::malformed_header("missing v1= element"));
    }
    Ok(ParsedHeader {
        timestamp,
        signatures,
    })
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Compute the signature header for a payload; exposed for tests and local
/// tooling that replays webhooks.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}
