//! Payment flows: intent creation from the catalogue and webhook dispatch.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, warn};

use super::error::Error;
use super::order::{Order, PaymentFailure};
use super::package::find_package;
use super::ports::{
    CreatePaymentIntent, CustomerHandle, OrderRepository, PaymentGateway, PaymentGatewayError,
    PaymentIntent, SubscriptionHandle, WebhookLedger,
};

/// A provider webhook event after signature verification.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub object: Value,
}

impl WebhookEvent {
    /// Parse a verified webhook payload.
    pub fn parse(payload: &[u8]) -> Result<Self, Error> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|err| Error::invalid_request(format!("webhook payload is not JSON: {err}")))?;
        let id = value["id"]
            .as_str()
            .ok_or_else(|| Error::invalid_request("webhook payload missing event id"))?
            .to_owned();
        let event_type = value["type"]
            .as_str()
            .ok_or_else(|| Error::invalid_request("webhook payload missing event type"))?
            .to_owned();
        let object = value["data"]["object"].clone();
        Ok(Self {
            id,
            event_type,
            object,
        })
    }
}

/// How a webhook delivery was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// First delivery, dispatched by type.
    Processed,
    /// The ledger has seen this event id before; nothing was written.
    AlreadyProcessed,
    /// Unknown event type, logged and dropped.
    Ignored,
}

fn map_gateway_error(error: PaymentGatewayError) -> Error {
    match error {
        PaymentGatewayError::Transport { message } => {
            Error::service_unavailable(format!("payment provider unreachable: {message}"))
        }
        PaymentGatewayError::Rejected { message } => {
            Error::invalid_request(format!("payment provider rejected the request: {message}"))
        }
        PaymentGatewayError::Decode { message } => {
            Error::internal(format!("payment provider response undecodable: {message}"))
        }
    }
}

/// Payment orchestration over the gateway, the order store, and the ledger.
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrderRepository>,
    ledger: Arc<dyn WebhookLedger>,
}

impl PaymentService {
    /// Create the service over its ports.
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrderRepository>,
        ledger: Arc<dyn WebhookLedger>,
    ) -> Self {
        Self {
            gateway,
            orders,
            ledger,
        }
    }

    /// Open a payment intent for a catalogue package.
    pub async fn create_intent(
        &self,
        package_id: &str,
        customer_email: &str,
        form_metadata: Value,
    ) -> Result<PaymentIntent, Error> {
        let package = find_package(package_id)
            .ok_or_else(|| Error::invalid_request(format!("unknown package id: {package_id}")))?;

        self.gateway
            .create_payment_intent(CreatePaymentIntent {
                amount: package.price,
                currency: "usd".into(),
                receipt_email: customer_email.to_owned(),
                metadata: json!({
                    "packageId": package.id,
                    "packageName": package.name,
                    "formData": form_metadata,
                }),
            })
            .await
            .map_err(map_gateway_error)
    }

    /// Fetch the provider's view of a payment intent.
    pub async fn payment_status(&self, intent_id: &str) -> Result<PaymentIntent, Error> {
        self.gateway
            .retrieve_payment_intent(intent_id)
            .await
            .map_err(map_gateway_error)
    }

    /// Create a provider customer record.
    pub async fn create_customer(
        &self,
        email: &str,
        name: &str,
    ) -> Result<CustomerHandle, Error> {
        self.gateway
            .create_customer(email, name)
            .await
            .map_err(map_gateway_error)
    }

    /// Open a subscription for recurring ad services.
    pub async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<SubscriptionHandle, Error> {
        self.gateway
            .create_subscription(customer_id, price_id)
            .await
            .map_err(map_gateway_error)
    }

    /// A customer's orders, each joined with its generated ad when present.
    pub async fn customer_orders(
        &self,
        email: &str,
    ) -> Result<Vec<crate::domain::ports::OrderWithAd>, Error> {
        self.orders
            .orders_for_email(email)
            .await
            .map_err(|err| Error::internal(format!("failed to load orders: {err}")))
    }

    /// Dispatch a verified webhook event.
    ///
    /// The ledger is consulted first: providers redeliver events, and only
    /// the first delivery may write. Order rows are keyed on the payment
    /// intent id, so even a ledger miss cannot produce duplicate orders.
    pub async fn process_webhook(&self, event: &WebhookEvent) -> Result<WebhookOutcome, Error> {
        let first_delivery = self
            .ledger
            .record_if_new(&event.id, &event.event_type)
            .await
            .map_err(|err| Error::internal(format!("webhook ledger failed: {err}")))?;
        if !first_delivery {
            info!(event_id = %event.id, "webhook replay acknowledged without processing");
            return Ok(WebhookOutcome::AlreadyProcessed);
        }

        match event.event_type.as_str() {
            "payment_intent.succeeded" => {
                self.handle_payment_success(event).await?;
                Ok(WebhookOutcome::Processed)
            }
            "payment_intent.payment_failed" => {
                self.handle_payment_failure(event).await?;
                Ok(WebhookOutcome::Processed)
            }
            "customer.subscription.created" => {
                // Recurring generation is logged only; no scheduler exists.
                info!(
                    subscription_id = event.object["id"].as_str().unwrap_or("unknown"),
                    "subscription created"
                );
                Ok(WebhookOutcome::Processed)
            }
            other => {
                info!(event_type = other, "unhandled webhook event type dropped");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn handle_payment_success(&self, event: &WebhookEvent) -> Result<(), Error> {
        let intent = &event.object;
        let payment_intent_id = intent["id"]
            .as_str()
            .ok_or_else(|| Error::invalid_request("payment intent missing id"))?;

        let order = Order {
            id: Order::generate_id(),
            customer_email: intent["receipt_email"].as_str().unwrap_or_default().to_owned(),
            package_id: intent["metadata"]["packageId"]
                .as_str()
                .unwrap_or_default()
                .to_owned(),
            amount: intent["amount"].as_i64().unwrap_or(0),
            status: "paid".into(),
            payment_intent_id: payment_intent_id.to_owned(),
            metadata: intent["metadata"].clone(),
            created_at: chrono::Utc::now(),
        };

        self.orders
            .upsert_by_payment_intent(&order)
            .await
            .map_err(|err| Error::internal(format!("failed to persist order: {err}")))?;

        // Ad creation after payment is a stub boundary: the order is
        // recorded and the trigger is logged, nothing more.
        info!(payment_intent_id, "payment succeeded; ad creation trigger recorded");
        Ok(())
    }

    async fn handle_payment_failure(&self, event: &WebhookEvent) -> Result<(), Error> {
        let intent = &event.object;
        let failure = PaymentFailure {
            payment_intent_id: intent["id"].as_str().unwrap_or_default().to_owned(),
            amount: intent["amount"].as_i64().unwrap_or(0),
            currency: intent["currency"].as_str().unwrap_or("usd").to_owned(),
            reason: intent["last_payment_error"]["message"]
                .as_str()
                .unwrap_or("Payment failed")
                .to_owned(),
        };

        warn!(payment_intent_id = %failure.payment_intent_id, reason = %failure.reason, "payment failed");
        self.orders
            .record_failure(&failure)
            .await
            .map_err(|err| Error::internal(format!("failed to log payment failure: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        FixtureOrderRepository, FixturePaymentGateway, FixtureWebhookLedger, MockPaymentGateway,
    };

    fn succeeded_payload(event_id: &str, intent_id: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": event_id,
            "type": "payment_intent.succeeded",
            "data": { "object": {
                "id": intent_id,
                "amount": 49700,
                "receipt_email": "buyer@example.com",
                "metadata": { "packageId": "pkg_basic" }
            }}
        }))
        .expect("payload serializes")
    }

    fn service_with(orders: Arc<FixtureOrderRepository>) -> PaymentService {
        PaymentService::new(
            Arc::new(FixturePaymentGateway),
            orders,
            Arc::new(FixtureWebhookLedger::default()),
        )
    }

    #[tokio::test]
    async fn create_intent_rejects_unknown_package() {
        let service = service_with(Arc::new(FixtureOrderRepository::default()));
        let err = service
            .create_intent("pkg_platinum", "a@b.co", Value::Null)
            .await
            .expect_err("unknown package");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn create_intent_charges_the_catalogue_price() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_payment_intent()
            .withf(|req: &CreatePaymentIntent| {
                req.amount == 99_700 && req.metadata["packageId"] == "pkg_pro"
            })
            .times(1)
            .returning(|req| {
                Ok(PaymentIntent {
                    id: "pi_1".into(),
                    client_secret: Some("secret".into()),
                    status: "requires_payment_method".into(),
                    amount: req.amount,
                    currency: req.currency,
                    metadata: req.metadata,
                    receipt_email: Some(req.receipt_email),
                })
            });
        let service = PaymentService::new(
            Arc::new(gateway),
            Arc::new(FixtureOrderRepository::default()),
            Arc::new(FixtureWebhookLedger::default()),
        );

        let intent = service
            .create_intent("pkg_pro", "buyer@example.com", json!({"industry": "tech"}))
            .await
            .expect("intent created");
        assert_eq!(intent.amount, 99_700);
    }

    #[tokio::test]
    async fn successful_payment_persists_one_order() {
        let orders = Arc::new(FixtureOrderRepository::default());
        let service = service_with(orders.clone());

        let event = WebhookEvent::parse(&succeeded_payload("evt_1", "pi_1")).expect("parses");
        let outcome = service.process_webhook(&event).await.expect("processed");
        assert_eq!(outcome, WebhookOutcome::Processed);
        assert_eq!(orders.order_count(), 1);
    }

    #[tokio::test]
    async fn replayed_event_id_does_not_write_twice() {
        let orders = Arc::new(FixtureOrderRepository::default());
        let service = service_with(orders.clone());
        let event = WebhookEvent::parse(&succeeded_payload("evt_1", "pi_1")).expect("parses");

        assert_eq!(
            service.process_webhook(&event).await.expect("first"),
            WebhookOutcome::Processed
        );
        assert_eq!(
            service.process_webhook(&event).await.expect("replay"),
            WebhookOutcome::AlreadyProcessed
        );
        assert_eq!(orders.order_count(), 1);
    }

    #[tokio::test]
    async fn distinct_events_for_one_intent_still_converge_on_one_order() {
        let orders = Arc::new(FixtureOrderRepository::default());
        let service = service_with(orders.clone());

        for event_id in ["evt_1", "evt_2"] {
            let event =
                WebhookEvent::parse(&succeeded_payload(event_id, "pi_same")).expect("parses");
            service.process_webhook(&event).await.expect("processed");
        }
        // Natural-key upsert: same intent, one row.
        assert_eq!(orders.order_count(), 1);
    }

    #[tokio::test]
    async fn failed_payment_is_logged_not_ordered() {
        let orders = Arc::new(FixtureOrderRepository::default());
        let service = service_with(orders.clone());
        let payload = serde_json::to_vec(&json!({
            "id": "evt_f",
            "type": "payment_intent.payment_failed",
            "data": { "object": {
                "id": "pi_f",
                "amount": 49700,
                "currency": "usd",
                "last_payment_error": { "message": "card declined" }
            }}
        }))
        .expect("payload");

        let event = WebhookEvent::parse(&payload).expect("parses");
        service.process_webhook(&event).await.expect("processed");
        assert_eq!(orders.order_count(), 0);
        assert_eq!(orders.failure_count(), 1);
    }

    #[tokio::test]
    async fn unknown_event_types_are_dropped() {
        let service = service_with(Arc::new(FixtureOrderRepository::default()));
        let payload = serde_json::to_vec(&json!({
            "id": "evt_u",
            "type": "invoice.finalized",
            "data": { "object": {} }
        }))
        .expect("payload");

        let event = WebhookEvent::parse(&payload).expect("parses");
        assert_eq!(
            service.process_webhook(&event).await.expect("ignored"),
            WebhookOutcome::Ignored
        );
    }

    #[test]
    fn parse_rejects_payloads_without_id_or_type() {
        assert!(WebhookEvent::parse(b"{\"type\":\"x\"}").is_err());
        assert!(WebhookEvent::parse(b"{\"id\":\"evt\"}").is_err());
        assert!(WebhookEvent::parse(b"not json").is_err());
    }
}
