//! PostgreSQL-backed [`WebhookLedger`] implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{WebhookLedger, WebhookLedgerError};

use super::models::NewWebhookEventRow;
use super::pool::{DbPool, PoolError};
use super::schema::webhook_events;

/// Diesel adapter for the webhook dedup ledger.
#[derive(Clone)]
pub struct DieselWebhookLedger {
    pool: DbPool,
}

impl DieselWebhookLedger {
    /// Create the ledger over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WebhookLedgerError {
    WebhookLedgerError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> WebhookLedgerError {
    debug!(error = %error, "webhook ledger query failed");
    WebhookLedgerError::query(error.to_string())
}

#[async_trait]
impl WebhookLedger for DieselWebhookLedger {
    async fn record_if_new(
        &self,
        event_id: &str,
        event_type: &str,
    ) -> Result<bool, WebhookLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewWebhookEventRow {
            id: event_id,
            event_type,
            received_at: Utc::now(),
        };

        // Conflict on the primary key means a replayed delivery: zero rows
        // inserted, nothing overwritten.
        let inserted = diesel::insert_into(webhook_events::table)
            .values(&row)
            .on_conflict(webhook_events::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(inserted == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_map_to_connection_variant() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, WebhookLedgerError::Connection { .. }));
    }
}
