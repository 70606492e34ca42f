//! Orders and payment failures recorded from provider webhooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// A paid order, created on a successful payment webhook.
///
/// The external payment-intent id is the natural key: duplicate webhook
/// deliveries for the same intent must converge on a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_email: String,
    pub package_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub status: String,
    pub payment_intent_id: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Generate a fresh order identifier.
    pub fn generate_id() -> String {
        format!("order_{}", Uuid::new_v4().simple())
    }
}

/// Append-only record of a failed payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailure {
    pub payment_intent_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub reason: String,
}
