//! End-to-end HTTP tests for the intake → preview → embed flow, driven over
//! fixture ports.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::{test as actix_test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use backend::domain::ad_service::AdCreationService;
use backend::domain::analytics_service::AnalyticsService;
use backend::domain::delivery_service::DeliveryService;
use backend::domain::lead_service::LeadSourcingService;
use backend::domain::payment_service::PaymentService;
use backend::domain::ports::{
    FixtureAdRepository, FixtureAnalyticsRepository, FixtureLeadRepository,
    FixtureOrderRepository, FixturePaymentGateway, FixturePlacesDirectory, FixtureVideoInspiration,
    FixtureWebSearch, FixtureWebhookLedger, FixtureWebhookVerifier, TextGenerationError,
    TextGenerator,
};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::server::build_app;

/// Generator that counts calls and always fails, driving the fallback path.
#[derive(Default)]
struct CountingTextGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for CountingTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, TextGenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TextGenerationError::transport("offline in tests"))
    }
}

struct TestHarness {
    state: HttpState,
    text: Arc<CountingTextGenerator>,
}

fn harness() -> TestHarness {
    let text = Arc::new(CountingTextGenerator::default());
    let ads = Arc::new(FixtureAdRepository::default());
    let base_url = "http://localhost:8080";

    let state = HttpState {
        ad_creation: Arc::new(AdCreationService::new(text.clone(), ads.clone(), base_url)),
        payments: Arc::new(PaymentService::new(
            Arc::new(FixturePaymentGateway),
            Arc::new(FixtureOrderRepository::default()),
            Arc::new(FixtureWebhookLedger::default()),
        )),
        analytics: Arc::new(AnalyticsService::new(Arc::new(
            FixtureAnalyticsRepository::default(),
        ))),
        leads: Arc::new(LeadSourcingService::new(
            Arc::new(FixturePlacesDirectory),
            Arc::new(FixtureVideoInspiration),
            Arc::new(FixtureWebSearch),
            text.clone(),
            Arc::new(FixtureLeadRepository::default()),
        )),
        delivery: Arc::new(DeliveryService::new(base_url)),
        ads,
        webhook_verifier: Arc::new(FixtureWebhookVerifier),
    };

    TestHarness { state, text }
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

fn acme_form() -> Value {
    json!({
        "businessName": "Acme",
        "businessWebsite": "https://acme.com",
        "industry": "tech",
        "adGoal": "leads",
        "targetAudience": "devs",
        "keyMessage": "fast",
        "callToAction": "Buy",
        "ctaLink": "https://acme.com/buy"
    })
}

#[actix_web::test]
async fn submit_returns_preview_and_three_packages() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/intake/submit")
            .set_json(acme_form())
            .to_request(),
    )
    .await;

    assert!(response.status().is_success());
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["success"], true);

    let preview = &body["data"]["adPreview"];
    for blob in ["html", "css", "javascript"] {
        let text = preview[blob].as_str().expect("blob is a string");
        assert!(!text.is_empty(), "{blob} must be non-empty");
    }
    assert_eq!(body["data"]["packages"].as_array().expect("packages").len(), 3);
}

#[actix_web::test]
async fn invalid_submission_lists_missing_fields_and_skips_generation() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/intake/submit")
            .set_json(json!({ "businessName": "Acme" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid form data");
    // One entry per missing field; 7 of 8 are blank.
    assert_eq!(body["details"].as_array().expect("details").len(), 7);
    assert_eq!(harness.text.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn generate_ad_persists_and_embed_round_trips() {
    let harness = harness();
    let app = app_for(harness.state.clone()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/intake/generate-ad")
            .set_json(json!({
                "paymentIntentId": "pi_test_1",
                "packageId": "pkg_pro",
                "formData": acme_form(),
            }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success());
    let body: Value = actix_test::read_body_json(response).await;
    let ad_id = body["data"]["id"].as_str().expect("ad id").to_owned();

    // The stored ad is retrievable.
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/ads/{ad_id}"))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success());

    // Embed and download serve byte-identical documents.
    let embed = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/embed/{ad_id}"))
            .to_request(),
    )
    .await;
    assert!(embed.status().is_success());
    let embed_bytes = actix_test::read_body(embed).await;

    let download = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/payment/download/{ad_id}"))
            .to_request(),
    )
    .await;
    assert!(download.status().is_success());
    let download_bytes = actix_test::read_body(download).await;

    assert_eq!(embed_bytes, download_bytes);
    assert!(embed_bytes.starts_with(b"<!DOCTYPE html>"));
}

#[actix_web::test]
async fn unknown_ad_embed_is_404() {
    let harness = harness();
    let app = app_for(harness.state).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/embed/ad_missing")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn performance_for_unknown_ad_is_zeroed() {
    let harness = harness();
    let app = app_for(harness.state).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/ads/nonexistent-ad-id/performance")
            .to_request(),
    )
    .await;
    assert!(response.status().is_success());
    let body: Value = actix_test::read_body_json(response).await;
    let data = &body["data"];
    for key in ["impressions", "clicks", "conversions"] {
        assert_eq!(data[key], 0, "{key} must be zero");
    }
    assert_eq!(data["ctr"], 0.0);
    assert_eq!(data["conversionRate"], 0.0);
}

#[actix_web::test]
async fn dashboard_is_stable_between_reads() {
    let harness = harness();
    let app = app_for(harness.state).await;

    // Seed a few events through the tracking endpoint.
    for event_type in ["impression", "impression", "click"] {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/ads/ad_seed/track/{event_type}"))
                .set_json(json!({ "url": "https://host.example" }))
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());
    }

    let mut readings = Vec::new();
    for _ in 0..2 {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/analytics/dashboard")
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());
        let body: Value = actix_test::read_body_json(response).await;
        readings.push(body["data"].clone());
    }

    assert_eq!(readings[0], readings[1]);
    assert_eq!(readings[0]["totalImpressions"], 2);
    assert_eq!(readings[0]["totalClicks"], 1);
}

#[actix_web::test]
async fn unknown_event_type_is_rejected() {
    let harness = harness();
    let app = app_for(harness.state).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/ads/ad_1/track/hover")
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn packages_endpoint_lists_the_catalogue() {
    let harness = harness();
    let app = app_for(harness.state).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/intake/packages")
            .to_request(),
    )
    .await;
    assert!(response.status().is_success());
    let body: Value = actix_test::read_body_json(response).await;
    let packages = body["data"].as_array().expect("package array");
    assert_eq!(packages.len(), 3);
    assert_eq!(packages[0]["id"], "pkg_basic");
    assert_eq!(packages[2]["price"], 297_000);
}

#[actix_web::test]
async fn health_probe_reports_uptime() {
    let harness = harness();
    let app = app_for(harness.state).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert!(response.status().is_success());
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime"].is_u64());
}
