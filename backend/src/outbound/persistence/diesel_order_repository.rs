//! PostgreSQL-backed [`OrderRepository`] implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Int8, Jsonb, Nullable, Text, Timestamptz, Varchar};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::order::{Order, PaymentFailure};
use crate::domain::ports::{OrderRepository, OrderRepositoryError, OrderWithAd};

use super::models::{NewOrderRow, NewPaymentFailureRow};
use super::pool::{DbPool, PoolError};
use super::schema::{orders, payment_failures};

/// Diesel adapter for orders and the payment-failure log.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create the repository over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    OrderRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    debug!(error = %error, "orders query failed");
    OrderRepositoryError::query(error.to_string())
}

/// Joined projection for `orders_for_email`.
#[derive(QueryableByName)]
struct OrderWithAdRow {
    #[diesel(sql_type = Varchar)]
    id: String,
    #[diesel(sql_type = Varchar)]
    customer_email: String,
    #[diesel(sql_type = Varchar)]
    package_id: String,
    #[diesel(sql_type = Int8)]
    amount: i64,
    #[diesel(sql_type = Varchar)]
    status: String,
    #[diesel(sql_type = Varchar)]
    payment_intent_id: String,
    #[diesel(sql_type = Jsonb)]
    metadata: serde_json::Value,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = Nullable<Text>)]
    html: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    css: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    javascript: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    preview: Option<String>,
}

impl From<OrderWithAdRow> for OrderWithAd {
    fn from(row: OrderWithAdRow) -> Self {
        Self {
            order: Order {
                id: row.id,
                customer_email: row.customer_email,
                package_id: row.package_id,
                amount: row.amount,
                status: row.status,
                payment_intent_id: row.payment_intent_id,
                metadata: row.metadata,
                created_at: row.created_at,
            },
            html: row.html,
            css: row.css,
            javascript: row.javascript,
            preview: row.preview,
        }
    }
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn upsert_by_payment_intent(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewOrderRow {
            id: &order.id,
            customer_email: &order.customer_email,
            package_id: &order.package_id,
            amount: order.amount,
            status: &order.status,
            payment_intent_id: &order.payment_intent_id,
            metadata: &order.metadata,
            created_at: order.created_at,
            updated_at: order.created_at,
        };

        diesel::insert_into(orders::table)
            .values(&row)
            .on_conflict(orders::payment_intent_id)
            .do_update()
            .set((
                orders::status.eq(&order.status),
                orders::metadata.eq(&order.metadata),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn orders_for_email(
        &self,
        email: &str,
    ) -> Result<Vec<OrderWithAd>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrderWithAdRow> = diesel::sql_query(
            "SELECT o.id, o.customer_email, o.package_id, o.amount, o.status, \
                    o.payment_intent_id, o.metadata, o.created_at, \
                    a.html, a.css, a.javascript, a.preview \
             FROM orders o \
             LEFT JOIN ads a ON o.payment_intent_id = a.payment_intent_id \
             WHERE o.customer_email = $1 \
             ORDER BY o.created_at DESC",
        )
        .bind::<Varchar, _>(email)
        .load(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(OrderWithAd::from).collect())
    }

    async fn record_failure(
        &self,
        failure: &PaymentFailure,
    ) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewPaymentFailureRow {
            payment_intent_id: &failure.payment_intent_id,
            amount: failure.amount,
            currency: &failure.currency,
            failure_reason: &failure.reason,
            created_at: Utc::now(),
        };

        diesel::insert_into(payment_failures::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_map_to_connection_variant() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, OrderRepositoryError::Connection { .. }));
    }

    #[test]
    fn diesel_errors_map_to_query_variant() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, OrderRepositoryError::Query { .. }));
    }
}
