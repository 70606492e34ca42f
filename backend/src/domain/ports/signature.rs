//! Port for webhook signature verification.

/// Why a webhook payload failed verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The signature header is missing required elements or unparseable.
    #[error("malformed signature header: {message}")]
    MalformedHeader { message: String },
    /// The computed digest does not match the supplied one.
    #[error("signature mismatch")]
    Mismatch,
    /// The signed timestamp falls outside the accepted tolerance.
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,
}

impl SignatureError {
    pub fn malformed_header(message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            message: message.into(),
        }
    }
}

/// Verifies that a raw webhook payload was signed by the provider.
pub trait WebhookVerifier: Send + Sync {
    /// Check `header` against `payload`; `Ok(())` means authentic.
    fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError>;
}

/// Fixture verifier accepting every payload; for wiring without a configured
/// webhook secret and for tests that exercise the post-verification path.
pub struct FixtureWebhookVerifier;

impl WebhookVerifier for FixtureWebhookVerifier {
    fn verify(&self, _payload: &[u8], _header: &str) -> Result<(), SignatureError> {
        Ok(())
    }
}
