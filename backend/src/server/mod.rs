//! Server assembly: port wiring, app construction, and startup.

mod config;

pub use config::AppConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ad_service::AdCreationService;
use crate::domain::analytics_service::AnalyticsService;
use crate::domain::delivery_service::DeliveryService;
use crate::domain::lead_service::LeadSourcingService;
use crate::domain::payment_service::PaymentService;
use crate::domain::ports::{
    AdRepository, AnalyticsRepository, FixtureAdRepository, FixtureAnalyticsRepository,
    FixtureLeadRepository, FixtureOrderRepository, FixturePaymentGateway, FixturePlacesDirectory,
    FixtureTextGenerator, FixtureVideoInspiration, FixtureWebSearch, FixtureWebhookLedger,
    FixtureWebhookVerifier, LeadRepository, OrderRepository, PaymentGateway, PlacesDirectory,
    TextGenerator, VideoInspiration, WebSearch, WebhookLedger, WebhookVerifier,
};
use crate::inbound::http::health::{HealthState, health};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ads, analytics, embed, intake, payment};
use crate::middleware::Trace;
use crate::outbound::brave::BraveSearchClient;
use crate::outbound::gemini::GeminiClient;
use crate::outbound::google::GoogleApiClient;
use crate::outbound::persistence::{
    DbPool, DieselAdRepository, DieselAnalyticsRepository, DieselLeadRepository,
    DieselOrderRepository, DieselWebhookLedger,
};
use crate::outbound::stripe::{StripeGateway, StripeWebhookVerifier};

fn client_error(context: &str, err: reqwest::Error) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Wire the HTTP state: database-backed repositories when a pool is
/// available, real API clients when keys are configured, fixtures otherwise.
pub fn build_http_state(
    config: &AppConfig,
    pool: Option<DbPool>,
) -> std::io::Result<HttpState> {
    let (ads_repo, orders_repo, leads_repo, analytics_repo, ledger): (
        Arc<dyn AdRepository>,
        Arc<dyn OrderRepository>,
        Arc<dyn LeadRepository>,
        Arc<dyn AnalyticsRepository>,
        Arc<dyn WebhookLedger>,
    ) = match pool {
        Some(pool) => (
            Arc::new(DieselAdRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool.clone())),
            Arc::new(DieselLeadRepository::new(pool.clone())),
            Arc::new(DieselAnalyticsRepository::new(pool.clone())),
            Arc::new(DieselWebhookLedger::new(pool)),
        ),
        None => (
            Arc::new(FixtureAdRepository::default()),
            Arc::new(FixtureOrderRepository::default()),
            Arc::new(FixtureLeadRepository::default()),
            Arc::new(FixtureAnalyticsRepository::default()),
            Arc::new(FixtureWebhookLedger::default()),
        ),
    };

    let text: Arc<dyn TextGenerator> = match &config.google_api_key {
        Some(key) => Arc::new(
            GeminiClient::new(key.clone())
                .map_err(|err| client_error("text generation client", err))?,
        ),
        None => Arc::new(FixtureTextGenerator),
    };

    let (places, video): (Arc<dyn PlacesDirectory>, Arc<dyn VideoInspiration>) =
        match &config.google_api_key {
            Some(key) => {
                let client = Arc::new(
                    GoogleApiClient::new(key.clone())
                        .map_err(|err| client_error("places client", err))?,
                );
                (client.clone(), client)
            }
            None => (
                Arc::new(FixturePlacesDirectory),
                Arc::new(FixtureVideoInspiration),
            ),
        };

    let search: Arc<dyn WebSearch> = match &config.brave_api_key {
        Some(key) => Arc::new(
            BraveSearchClient::new(key.clone())
                .map_err(|err| client_error("web search client", err))?,
        ),
        None => Arc::new(FixtureWebSearch),
    };

    let gateway: Arc<dyn PaymentGateway> = match &config.stripe_secret_key {
        Some(key) => Arc::new(
            StripeGateway::new(key.clone())
                .map_err(|err| client_error("payment gateway client", err))?,
        ),
        None => Arc::new(FixturePaymentGateway),
    };

    let webhook_verifier: Arc<dyn WebhookVerifier> = match &config.stripe_webhook_secret {
        Some(secret) => Arc::new(StripeWebhookVerifier::new(secret.clone())),
        None => Arc::new(FixtureWebhookVerifier),
    };

    Ok(HttpState {
        ad_creation: Arc::new(AdCreationService::new(
            text.clone(),
            ads_repo.clone(),
            config.public_base_url.clone(),
        )),
        payments: Arc::new(PaymentService::new(gateway, orders_repo, ledger)),
        analytics: Arc::new(AnalyticsService::new(analytics_repo)),
        leads: Arc::new(LeadSourcingService::new(
            places, video, search, text, leads_repo,
        )),
        delivery: Arc::new(DeliveryService::new(config.public_base_url.clone())),
        ads: ads_repo,
        webhook_verifier,
    })
}

/// Assemble the actix application over prepared state.
pub fn build_app(
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let intake_scope = web::scope("/api/intake")
        .service(intake::submit_intake_form)
        .service(intake::get_packages)
        .service(intake::create_payment_intent)
        .service(intake::generate_final_ad)
        .service(intake::generate_google_leads)
        .service(intake::get_ad_inspiration)
        .service(intake::validate_google_api);

    let payment_scope = web::scope("/api/payment")
        .service(payment::handle_webhook)
        .service(payment::get_payment_status)
        .service(payment::create_customer)
        .service(payment::create_subscription)
        .service(payment::get_customer_orders)
        .service(payment::download_ad_package);

    // Specific segments before the catch-all `{ad_id}` match.
    let ads_scope = web::scope("/api/ads")
        .service(ads::get_ad_performance)
        .service(ads::deploy_ad)
        .service(ads::track_event)
        .service(ads::list_ads)
        .service(ads::get_ad);

    let analytics_scope = web::scope("/api/analytics")
        .service(analytics::get_dashboard_analytics)
        .service(analytics::get_realtime_analytics);

    let app = App::new()
        .app_data(http_state)
        .app_data(health_state)
        .wrap(Trace)
        .service(intake_scope)
        .service(payment_scope)
        .service(ads_scope)
        .service(analytics_scope)
        .service(embed::embed_ad)
        .service(health);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Build and start the HTTP server.
///
/// # Errors
/// Fails when an outbound client cannot be constructed or the listener
/// cannot bind.
pub fn run(config: &AppConfig, pool: Option<DbPool>) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(config, pool)?);
    let health_state = web::Data::new(HealthState::new());

    info!(addr = %config.bind_addr, "starting HTTP server");
    let server = HttpServer::new(move || build_app(http_state.clone(), health_state.clone()))
        .bind(config.bind_addr)?
        .run();
    Ok(server)
}
