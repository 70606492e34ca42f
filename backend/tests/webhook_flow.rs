//! End-to-end webhook tests: signature verification, order persistence, and
//! replay deduplication.

use std::sync::Arc;

use actix_web::{test as actix_test, web};
use chrono::Utc;
use serde_json::{Value, json};

use backend::domain::ad_service::AdCreationService;
use backend::domain::analytics_service::AnalyticsService;
use backend::domain::delivery_service::DeliveryService;
use backend::domain::lead_service::LeadSourcingService;
use backend::domain::payment_service::PaymentService;
use backend::domain::ports::{
    FixtureAdRepository, FixtureAnalyticsRepository, FixtureLeadRepository,
    FixtureOrderRepository, FixturePaymentGateway, FixturePlacesDirectory, FixtureTextGenerator,
    FixtureVideoInspiration, FixtureWebSearch, FixtureWebhookLedger,
};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::outbound::stripe::{StripeWebhookVerifier, sign_payload};
use backend::server::build_app;

const WEBHOOK_SECRET: &str = "whsec_test123secret456";

struct TestHarness {
    state: HttpState,
    orders: Arc<FixtureOrderRepository>,
}

fn harness() -> TestHarness {
    let orders = Arc::new(FixtureOrderRepository::default());
    let ads = Arc::new(FixtureAdRepository::default());
    let text = Arc::new(FixtureTextGenerator);
    let base_url = "http://localhost:8080";

    let state = HttpState {
        ad_creation: Arc::new(AdCreationService::new(text.clone(), ads.clone(), base_url)),
        payments: Arc::new(PaymentService::new(
            Arc::new(FixturePaymentGateway),
            orders.clone(),
            Arc::new(FixtureWebhookLedger::default()),
        )),
        analytics: Arc::new(AnalyticsService::new(Arc::new(
            FixtureAnalyticsRepository::default(),
        ))),
        leads: Arc::new(LeadSourcingService::new(
            Arc::new(FixturePlacesDirectory),
            Arc::new(FixtureVideoInspiration),
            Arc::new(FixtureWebSearch),
            text,
            Arc::new(FixtureLeadRepository::default()),
        )),
        delivery: Arc::new(DeliveryService::new(base_url)),
        ads,
        webhook_verifier: Arc::new(StripeWebhookVerifier::new(WEBHOOK_SECRET)),
    };

    TestHarness { state, orders }
}

async fn app_for(
    state: HttpState,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    actix_test::init_service(build_app(
        web::Data::new(state),
        web::Data::new(HealthState::new()),
    ))
    .await
}

fn succeeded_payload(event_id: &str, intent_id: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": event_id,
        "type": "payment_intent.succeeded",
        "data": { "object": {
            "id": intent_id,
            "amount": 49700,
            "currency": "usd",
            "receipt_email": "buyer@example.com",
            "metadata": { "packageId": "pkg_basic" }
        }}
    }))
    .expect("payload serializes")
}

fn webhook_request(payload: &[u8], signature: &str) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri("/api/payment/webhook")
        .insert_header(("stripe-signature", signature))
        .insert_header(("content-type", "application/json"))
        .set_payload(payload.to_vec())
        .to_request()
}

#[actix_web::test]
async fn valid_signature_records_the_order() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;
    let payload = succeeded_payload("evt_1", "pi_1");
    let signature = sign_payload(&payload, WEBHOOK_SECRET, Utc::now().timestamp());

    let response = actix_test::call_service(&app, webhook_request(&payload, &signature)).await;
    assert!(response.status().is_success());
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["received"], true);
    assert_eq!(harness.orders.order_count(), 1);
}

#[actix_web::test]
async fn invalid_signature_is_rejected_without_writes() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;
    let payload = succeeded_payload("evt_1", "pi_1");
    let signature = sign_payload(&payload, "wrong_secret", Utc::now().timestamp());

    let response = actix_test::call_service(&app, webhook_request(&payload, &signature)).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    assert_eq!(harness.orders.order_count(), 0);
}

#[actix_web::test]
async fn missing_signature_header_is_rejected() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;
    let payload = succeeded_payload("evt_1", "pi_1");

    let request = actix_test::TestRequest::post()
        .uri("/api/payment/webhook")
        .insert_header(("content-type", "application/json"))
        .set_payload(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    assert_eq!(harness.orders.order_count(), 0);
}

#[actix_web::test]
async fn stale_timestamp_is_rejected() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;
    let payload = succeeded_payload("evt_1", "pi_1");
    let signature = sign_payload(&payload, WEBHOOK_SECRET, Utc::now().timestamp() - 600);

    let response = actix_test::call_service(&app, webhook_request(&payload, &signature)).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    assert_eq!(harness.orders.order_count(), 0);
}

#[actix_web::test]
async fn replayed_delivery_acknowledges_without_a_second_order() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;
    let payload = succeeded_payload("evt_1", "pi_1");

    for _ in 0..2 {
        let signature = sign_payload(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
        let response = actix_test::call_service(&app, webhook_request(&payload, &signature)).await;
        assert!(response.status().is_success());
    }
    assert_eq!(harness.orders.order_count(), 1);
}

#[actix_web::test]
async fn tampered_payload_fails_verification() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;
    let payload = succeeded_payload("evt_1", "pi_1");
    let signature = sign_payload(&payload, WEBHOOK_SECRET, Utc::now().timestamp());

    let tampered = succeeded_payload("evt_1", "pi_other");
    let response = actix_test::call_service(&app, webhook_request(&tampered, &signature)).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    assert_eq!(harness.orders.order_count(), 0);
}

#[actix_web::test]
async fn unknown_event_types_are_acknowledged() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;
    let payload = serde_json::to_vec(&json!({
        "id": "evt_u",
        "type": "invoice.finalized",
        "data": { "object": {} }
    }))
    .expect("payload serializes");
    let signature = sign_payload(&payload, WEBHOOK_SECRET, Utc::now().timestamp());

    let response = actix_test::call_service(&app, webhook_request(&payload, &signature)).await;
    assert!(response.status().is_success());
    assert_eq!(harness.orders.order_count(), 0);
}

#[actix_web::test]
async fn recorded_orders_surface_in_customer_history() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;
    let payload = succeeded_payload("evt_1", "pi_1");
    let signature = sign_payload(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
    let response = actix_test::call_service(&app, webhook_request(&payload, &signature)).await;
    assert!(response.status().is_success());

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/payment/orders/buyer@example.com")
            .to_request(),
    )
    .await;
    assert!(response.status().is_success());
    let body: Value = actix_test::read_body_json(response).await;
    let orders = body["data"].as_array().expect("order array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["paymentIntentId"], "pi_1");
    assert_eq!(orders[0]["status"], "paid");
}
