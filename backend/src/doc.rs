//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::domain::ad::{Ad, AdMetadata};
use crate::domain::analytics::{AdPerformance, DashboardSummary, RealtimeSnapshot};
use crate::domain::delivery_service::{DeliveryReport, DeployMethod, DeployStatus};
use crate::domain::error::{Error, ErrorCode};
use crate::domain::intake::{DisplayFrequency, DisplayTrigger, IntakeForm};
use crate::inbound::http;

/// Public OpenAPI surface served by Swagger UI in debug builds.
#[derive(OpenApi)]
#[openapi(
    paths(
        http::intake::submit_intake_form,
        http::intake::get_packages,
        http::intake::create_payment_intent,
        http::intake::generate_final_ad,
        http::intake::generate_google_leads,
        http::intake::get_ad_inspiration,
        http::intake::validate_google_api,
        http::payment::handle_webhook,
        http::payment::get_payment_status,
        http::payment::create_customer,
        http::payment::create_subscription,
        http::payment::get_customer_orders,
        http::payment::download_ad_package,
        http::ads::list_ads,
        http::ads::get_ad,
        http::ads::get_ad_performance,
        http::ads::deploy_ad,
        http::ads::track_event,
        http::analytics::get_dashboard_analytics,
        http::analytics::get_realtime_analytics,
        http::embed::embed_ad,
        http::health::health,
    ),
    components(schemas(
        Ad,
        AdMetadata,
        AdPerformance,
        DashboardSummary,
        DeliveryReport,
        DeployMethod,
        DeployStatus,
        DisplayFrequency,
        DisplayTrigger,
        Error,
        ErrorCode,
        IntakeForm,
        RealtimeSnapshot,
    )),
    tags(
        (name = "intake", description = "Brief submission and ad generation"),
        (name = "payment", description = "Payment provider integration"),
        (name = "ads", description = "Generated ads and tracking"),
        (name = "analytics", description = "Aggregated reporting"),
        (name = "embed", description = "Hosted ad embedding"),
        (name = "health", description = "Probes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_lists_core_paths() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).expect("document serializes");
        let paths = json["paths"].as_object().expect("paths object");
        assert!(paths.contains_key("/api/intake/submit"));
        assert!(paths.contains_key("/api/payment/webhook"));
        assert!(paths.contains_key("/api/embed/{adId}"));
    }
}
