//! Reqwest-backed payment gateway over the provider's form-encoded REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::ports::{
    CreatePaymentIntent, CustomerHandle, PaymentGateway, PaymentGatewayError, PaymentIntent,
    SubscriptionHandle,
};

const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Stripe adapter for the [`PaymentGateway`] port.
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    /// Build the gateway against the production API.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(secret_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_api_base(secret_key, DEFAULT_API_BASE)
    }

    /// Build the gateway against an explicit API base (tests).
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_api_base(
        secret_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        })
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, PaymentGatewayError> {
        let response = self
            .client
            .post(format!("{}{path}", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<T, PaymentGatewayError> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    PaymentGatewayError::transport(error.to_string())
}

async fn decode_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, PaymentGatewayError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorEnvelopeDto>(&body)
            .ok()
            .and_then(|envelope| envelope.error.message)
            .unwrap_or_else(|| format!("status {}", status.as_u16()));
        return Err(PaymentGatewayError::rejected(message));
    }

    serde_json::from_slice(&body)
        .map_err(|err| PaymentGatewayError::decode(format!("invalid provider JSON: {err}")))
}

/// Flatten JSON metadata into `metadata[key]=value` form fields. Non-string
/// values are JSON-encoded; the provider only accepts string values.
fn metadata_form_fields(metadata: &Value, form: &mut Vec<(String, String)>) {
    let Some(map) = metadata.as_object() else {
        return;
    };
    for (key, value) in map {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        form.push((format!("metadata[{key}]"), rendered));
    }
}

#[derive(Deserialize)]
struct ErrorEnvelopeDto {
    #[serde(default)]
    error: ErrorDto,
}

#[derive(Deserialize, Default)]
struct ErrorDto {
    message: Option<String>,
}

#[derive(Deserialize)]
struct PaymentIntentDto {
    id: String,
    client_secret: Option<String>,
    status: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    metadata: Map<String, Value>,
    receipt_email: Option<String>,
}

impl From<PaymentIntentDto> for PaymentIntent {
    fn from(dto: PaymentIntentDto) -> Self {
        Self {
            id: dto.id,
            client_secret: dto.client_secret,
            status: dto.status,
            amount: dto.amount,
            currency: dto.currency,
            metadata: Value::Object(dto.metadata),
            receipt_email: dto.receipt_email,
        }
    }
}

#[derive(Deserialize)]
struct CustomerDto {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct SubscriptionDto {
    id: String,
    status: String,
    latest_invoice: Option<InvoiceDto>,
}

#[derive(Deserialize)]
struct InvoiceDto {
    payment_intent: Option<InvoicePaymentIntentDto>,
}

#[derive(Deserialize)]
struct InvoicePaymentIntentDto {
    client_secret: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let mut form = vec![
            ("amount".to_owned(), request.amount.to_string()),
            ("currency".to_owned(), request.currency.clone()),
            ("receipt_email".to_owned(), request.receipt_email.clone()),
            (
                "automatic_payment_methods[enabled]".to_owned(),
                "true".to_owned(),
            ),
        ];
        metadata_form_fields(&request.metadata, &mut form);

        let dto: PaymentIntentDto = self.post_form("/payment_intents", &form).await?;
        Ok(dto.into())
    }

    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let dto: PaymentIntentDto = self.get(&format!("/payment_intents/{intent_id}")).await?;
        Ok(dto.into())
    }

    async fn create_customer(
        &self,
        email: &str,
        name: &str,
    ) -> Result<CustomerHandle, PaymentGatewayError> {
        let form = vec![
            ("email".to_owned(), email.to_owned()),
            ("name".to_owned(), name.to_owned()),
            (
                "metadata[source]".to_owned(),
                "aisim-ad-automation".to_owned(),
            ),
        ];

        let dto: CustomerDto = self.post_form("/customers", &form).await?;
        Ok(CustomerHandle {
            id: dto.id,
            email: dto.email.unwrap_or_else(|| email.to_owned()),
            name: dto.name.unwrap_or_else(|| name.to_owned()),
        })
    }

    async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
    ) -> Result<SubscriptionHandle, PaymentGatewayError> {
        let form = vec![
            ("customer".to_owned(), customer_id.to_owned()),
            ("items[0][price]".to_owned(), price_id.to_owned()),
            (
                "payment_behavior".to_owned(),
                "default_incomplete".to_owned(),
            ),
            (
                "expand[0]".to_owned(),
                "latest_invoice.payment_intent".to_owned(),
            ),
        ];

        let dto: SubscriptionDto = self.post_form("/subscriptions", &form).await?;
        Ok(SubscriptionHandle {
            id: dto.id,
            status: dto.status,
            client_secret: dto
                .latest_invoice
                .and_then(|invoice| invoice.payment_intent)
                .and_then(|intent| intent.client_secret),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_fields_flatten_strings_and_encode_objects() {
        let mut form = Vec::new();
        metadata_form_fields(
            &json!({
                "packageId": "pkg_basic",
                "formData": { "industry": "tech" },
            }),
            &mut form,
        );
        form.sort();
        assert_eq!(
            form,
            vec![
                (
                    "metadata[formData]".to_owned(),
                    "{\"industry\":\"tech\"}".to_owned()
                ),
                ("metadata[packageId]".to_owned(), "pkg_basic".to_owned()),
            ]
        );
    }

    #[test]
    fn non_object_metadata_adds_no_fields() {
        let mut form = Vec::new();
        metadata_form_fields(&Value::Null, &mut form);
        assert!(form.is_empty());
    }

    #[test]
    fn payment_intent_dto_maps_to_domain() {
        let dto: PaymentIntentDto = serde_json::from_value(json!({
            "id": "pi_1",
            "client_secret": "pi_1_secret",
            "status": "requires_payment_method",
            "amount": 49700,
            "currency": "usd",
            "metadata": { "packageId": "pkg_basic" },
            "receipt_email": "a@b.co"
        }))
        .expect("dto decodes");
        let intent = PaymentIntent::from(dto);
        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.metadata["packageId"], "pkg_basic");
    }

    #[test]
    fn subscription_dto_surfaces_nested_client_secret() {
        let dto: SubscriptionDto = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "incomplete",
            "latest_invoice": { "payment_intent": { "client_secret": "pi_secret" } }
        }))
        .expect("dto decodes");
        assert_eq!(
            dto.latest_invoice
                .and_then(|i| i.payment_intent)
                .and_then(|p| p.client_secret)
                .as_deref(),
            Some("pi_secret")
        );
    }
}
