//! Payment API handlers: provider webhook, status, customers, subscriptions,
//! order history, and the ad download.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::domain::Error;
use crate::domain::payment_service::WebhookEvent;
use crate::domain::templates::embed_document;

use super::ApiResult;
use super::envelope::ok;
use super::state::HttpState;

/// Provider webhook endpoint.
///
/// Reads the raw body (signatures cover the exact bytes), verifies the
/// signature header, then dispatches. Any verification failure is a 400 and
/// nothing is persisted.
#[utoipa::path(
    post,
    path = "/api/payment/webhook",
    request_body(content = String, description = "Raw webhook payload"),
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Missing or invalid signature", body = Error)
    ),
    tags = ["payment"]
)]
#[post("/webhook")]
pub async fn handle_webhook(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = req
        .headers()
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::invalid_request("Missing stripe-signature header"))?;

    state
        .webhook_verifier
        .verify(&body, signature)
        .map_err(|err| {
            warn!(error = %err, "webhook signature verification failed");
            Error::invalid_request("Webhook signature verification failed")
        })?;

    let event = WebhookEvent::parse(&body)?;
    state.payments.process_webhook(&event).await?;

    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}

/// Provider-side status of a payment intent.
#[utoipa::path(
    get,
    path = "/api/payment/status/{paymentIntentId}",
    responses((status = 200, description = "Intent status")),
    tags = ["payment"]
)]
#[get("/status/{payment_intent_id}")]
pub async fn get_payment_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let intent = state.payments.payment_status(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ok(json!({
        "status": intent.status,
        "amount": intent.amount,
        "currency": intent.currency,
        "metadata": intent.metadata,
    }))))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
}

/// Create a provider customer record.
#[utoipa::path(
    post,
    path = "/api/payment/customer",
    responses(
        (status = 200, description = "Customer created"),
        (status = 400, description = "Missing email or name", body = Error)
    ),
    tags = ["payment"]
)]
#[post("/customer")]
pub async fn create_customer(
    state: web::Data<HttpState>,
    payload: web::Json<CreateCustomerRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    if request.email.is_empty() || request.name.is_empty() {
        return Err(Error::invalid_request("Email and name are required"));
    }

    let customer = state
        .payments
        .create_customer(&request.email, &request.name)
        .await?;
    Ok(HttpResponse::Ok().json(ok(json!({
        "customerId": customer.id,
        "email": customer.email,
        "name": customer.name,
    }))))
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    customer_id: String,
    #[serde(default)]
    price_id: String,
}

/// Open a subscription for recurring ad services.
#[utoipa::path(
    post,
    path = "/api/payment/subscription",
    responses(
        (status = 200, description = "Subscription created"),
        (status = 400, description = "Missing customer or price id", body = Error)
    ),
    tags = ["payment"]
)]
#[post("/subscription")]
pub async fn create_subscription(
    state: web::Data<HttpState>,
    payload: web::Json<CreateSubscriptionRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    if request.customer_id.is_empty() || request.price_id.is_empty() {
        return Err(Error::invalid_request("Customer ID and price ID are required"));
    }

    let subscription = state
        .payments
        .create_subscription(&request.customer_id, &request.price_id)
        .await?;
    Ok(HttpResponse::Ok().json(ok(json!({
        "subscriptionId": subscription.id,
        "status": subscription.status,
        "clientSecret": subscription.client_secret,
    }))))
}

/// A customer's orders joined with their generated ads.
#[utoipa::path(
    get,
    path = "/api/payment/orders/{customerEmail}",
    responses((status = 200, description = "Order history")),
    tags = ["payment"]
)]
#[get("/orders/{customer_email}")]
pub async fn get_customer_orders(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let orders = state.payments.customer_orders(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ok(orders)))
}

/// Download a purchased ad as a standalone HTML document.
///
/// Serves exactly the same bytes as the embed endpoint, with an attachment
/// disposition.
#[utoipa::path(
    get,
    path = "/api/payment/download/{adId}",
    responses(
        (status = 200, description = "Standalone ad document", content_type = "text/html"),
        (status = 404, description = "Unknown ad", body = Error)
    ),
    tags = ["payment"]
)]
#[get("/download/{ad_id}")]
pub async fn download_ad_package(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let ad_id = path.into_inner();
    let ad = state
        .ads
        .find_by_id(&ad_id)
        .await
        .map_err(|err| Error::internal(format!("ad lookup failed: {err}")))?
        .ok_or_else(|| Error::not_found("Ad not found"))?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"aisim-ad-{ad_id}.html\""),
        ))
        .body(embed_document(&ad)))
}
