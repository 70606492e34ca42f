//! Port for the card-payment provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Errors raised by payment gateway adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentGatewayError {
    /// Network-level failure reaching the provider.
    #[error("payment provider transport failed: {message}")]
    Transport { message: String },
    /// The provider rejected the request.
    #[error("payment provider rejected the request: {message}")]
    Rejected { message: String },
    /// The provider answered with an undecodable body.
    #[error("payment provider response undecodable: {message}")]
    Decode { message: String },
}

impl PaymentGatewayError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// A provider payment intent as seen by the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub metadata: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_email: Option<String>,
}

/// A provider customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerHandle {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// A provider subscription record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionHandle {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Request to open a payment intent.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePaymentIntent {
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub receipt_email: String,
    pub metadata: Value,
}

/// Driving port over the payment provider's REST surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError>;

    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError>;

    async fn create_customer(
        &self,
        email: &str,
        name: &str,
    ) -> Result<CustomerHandle, PaymentGatewayError>;

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<SubscriptionHandle, PaymentGatewayError>;
}

/// Fixture gateway answering with deterministic handles; used when no
/// provider key is configured and in tests.
pub struct FixturePaymentGateway;

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        Ok(PaymentIntent {
            id: "pi_fixture".into(),
            client_secret: Some("pi_fixture_secret".into()),
            status: "requires_payment_method".into(),
            amount: request.amount,
            currency: request.currency,
            metadata: request.metadata,
            receipt_email: Some(request.receipt_email),
        })
    }

    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        Ok(PaymentIntent {
            id: intent_id.to_owned(),
            client_secret: None,
            status: "succeeded".into(),
            amount: 0,
            currency: "usd".into(),
            metadata: Value::Null,
            receipt_email: None,
        })
    }

    async fn create_customer(
        &self,
        email: &str,
        name: &str,
    ) -> Result<CustomerHandle, PaymentGatewayError> {
        Ok(CustomerHandle {
            id: "cus_fixture".into(),
            email: email.to_owned(),
            name: name.to_owned(),
        })
    }

    async fn create_subscription(
        &self,
        _customer_id: &str,
        _price_id: &str,
    ) -> Result<SubscriptionHandle, PaymentGatewayError> {
        Ok(SubscriptionHandle {
            id: "sub_fixture".into(),
            status: "incomplete".into(),
            client_secret: None,
        })
    }
}
