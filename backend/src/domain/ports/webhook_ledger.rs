//! Port for the webhook event ledger.
//!
//! Payment providers redeliver webhooks as a matter of course; the ledger
//! records processed provider event ids so a replay short-circuits instead of
//! writing a second order.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

/// Persistence errors raised by ledger adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookLedgerError {
    /// Repository connection could not be established.
    #[error("webhook ledger connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("webhook ledger query failed: {message}")]
    Query { message: String },
}

impl WebhookLedgerError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookLedger: Send + Sync {
    /// Record the event id if unseen. Returns `true` when this delivery is
    /// the first one; `false` means a replay.
    async fn record_if_new(
        &self,
        event_id: &str,
        event_type: &str,
    ) -> Result<bool, WebhookLedgerError>;
}

/// In-memory ledger for tests and keyless local runs.
#[derive(Default)]
pub struct FixtureWebhookLedger {
    seen: Mutex<HashSet<String>>,
}

#[async_trait]
impl WebhookLedger for FixtureWebhookLedger {
    async fn record_if_new(
        &self,
        event_id: &str,
        _event_type: &str,
    ) -> Result<bool, WebhookLedgerError> {
        let mut seen = self
            .seen
            .lock()
            .map_err(|e| WebhookLedgerError::query(e.to_string()))?;
        Ok(seen.insert(event_id.to_owned()))
    }
}
