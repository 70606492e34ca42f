//! Port for order and payment-failure persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::order::{Order, PaymentFailure};

/// Persistence errors raised by order repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderRepositoryError {
    /// Repository connection could not be established.
    #[error("order repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("order repository query failed: {message}")]
    Query { message: String },
}

impl OrderRepositoryError {
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

/// An order joined with its generated ad's blobs, when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithAd {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub javascript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order, or update status/metadata when a row for the same
    /// payment-intent id already exists. The payment-intent id is the natural
    /// key: replayed webhook deliveries must converge on one row.
    async fn upsert_by_payment_intent(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// A customer's orders, newest first, each joined with its ad if present.
    async fn orders_for_email(&self, email: &str)
    -> Result<Vec<OrderWithAd>, OrderRepositoryError>;

    /// Append a payment failure to the log.
    async fn record_failure(&self, failure: &PaymentFailure)
    -> Result<(), OrderRepositoryError>;
}

/// In-memory repository for tests and keyless local runs.
#[derive(Default)]
pub struct FixtureOrderRepository {
    orders: Mutex<HashMap<String, Order>>,
    failures: Mutex<Vec<PaymentFailure>>,
}

impl FixtureOrderRepository {
    /// Number of stored orders (test observability).
    pub fn order_count(&self) -> usize {
        self.orders.lock().map(|o| o.len()).unwrap_or(0)
    }

    /// Number of logged failures (test observability).
    pub fn failure_count(&self) -> usize {
        self.failures.lock().map(|f| f.len()).unwrap_or(0)
    }
}

#[async_trait]
impl OrderRepository for FixtureOrderRepository {
    async fn upsert_by_payment_intent(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|e| OrderRepositoryError::query(e.to_string()))?;
        // Keyed on the natural key, not the generated row id.
        orders.insert(order.payment_intent_id.clone(), order.clone());
        Ok(())
    }

    async fn orders_for_email(
        &self,
        email: &str,
    ) -> Result<Vec<OrderWithAd>, OrderRepositoryError> {
        let orders = self
            .orders
            .lock()
            .map_err(|e| OrderRepositoryError::query(e.to_string()))?;
        let mut matched: Vec<OrderWithAd> = orders
            .values()
            .filter(|o| o.customer_email == email)
            .cloned()
            .map(|order| OrderWithAd {
                order,
                html: None,
                css: None,
                javascript: None,
                preview: None,
            })
            .collect();
        matched.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        Ok(matched)
    }

    async fn record_failure(
        &self,
        failure: &PaymentFailure,
    ) -> Result<(), OrderRepositoryError> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|e| OrderRepositoryError::query(e.to_string()))?;
        failures.push(failure.clone());
        Ok(())
    }
}
