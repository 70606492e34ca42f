//! Intake API handlers: form submission, packages, payment intent, final ad
//! generation, lead discovery, and inspiration.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::Error;
use crate::domain::analytics::EventType;
use crate::domain::analytics_service::EventContext;
use crate::domain::intake::IntakeForm;
use crate::domain::lead_service::PlacesCriteria;
use crate::domain::package::PACKAGES;

use super::ApiResult;
use super::envelope::ok;
use super::state::HttpState;

fn request_context(req: &HttpRequest) -> EventContext {
    let referrer = req
        .headers()
        .get(actix_web::http::header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    EventContext {
        url: referrer.clone(),
        referrer,
        user_agent: req
            .headers()
            .get(actix_web::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        ip_address: req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_owned),
        metadata: None,
    }
}

/// Submit the intake form: validate, render a preview ad, and return the
/// package catalogue.
#[utoipa::path(
    post,
    path = "/api/intake/submit",
    request_body = IntakeForm,
    responses(
        (status = 200, description = "Preview ad and packages"),
        (status = 400, description = "Missing required fields", body = Error)
    ),
    tags = ["intake"]
)]
#[post("/submit")]
pub async fn submit_intake_form(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<IntakeForm>,
) -> ApiResult<HttpResponse> {
    let form = payload.into_inner();

    let report = form.validate();
    if !report.valid {
        return Err(Error::invalid_request("Invalid form data").with_details(json!(report.errors)));
    }

    let preview = state.ad_creation.generate_preview(&form).await?;

    // The submission itself is a conversion for the funnel dashboard.
    let mut context = request_context(&req);
    context.metadata = Some(json!({ "formData": form }));
    state
        .analytics
        .track("intake_form", EventType::Conversion, context)
        .await;

    Ok(HttpResponse::Ok().json(ok(json!({
        "adPreview": preview,
        "packages": PACKAGES,
    }))))
}

/// List the pricing catalogue.
#[utoipa::path(
    get,
    path = "/api/intake/packages",
    responses((status = 200, description = "The three package tiers")),
    tags = ["intake"]
)]
#[get("/packages")]
pub async fn get_packages() -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ok(PACKAGES)))
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    #[serde(default)]
    package_id: String,
    #[serde(default)]
    customer_email: String,
    #[serde(default)]
    form_data: serde_json::Value,
}

/// Open a payment intent for a selected package.
#[utoipa::path(
    post,
    path = "/api/intake/payment-intent",
    responses(
        (status = 200, description = "Client secret for the payment flow"),
        (status = 400, description = "Missing package or email", body = Error)
    ),
    tags = ["intake"]
)]
#[post("/payment-intent")]
pub async fn create_payment_intent(
    state: web::Data<HttpState>,
    payload: web::Json<PaymentIntentRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    if request.package_id.is_empty() || request.customer_email.is_empty() {
        return Err(Error::invalid_request(
            "Package ID and customer email are required",
        ));
    }

    let intent = state
        .payments
        .create_intent(&request.package_id, &request.customer_email, request.form_data)
        .await?;

    Ok(HttpResponse::Ok().json(ok(json!({
        "clientSecret": intent.client_secret,
        "paymentIntentId": intent.id,
    }))))
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAdRequest {
    payment_intent_id: Option<String>,
    package_id: Option<String>,
    form_data: Option<IntakeForm>,
    company_name: Option<String>,
    industry: Option<String>,
    target_audience: Option<String>,
    key_message: Option<String>,
    call_to_action: Option<String>,
    cta_link: Option<String>,
}

impl GenerateAdRequest {
    /// Merge the nested form with top-level overrides, defaulting anything
    /// still missing so generation always has a workable brief.
    fn into_form_and_ids(self) -> (IntakeForm, Option<String>, String) {
        let mut form = self.form_data.unwrap_or_default();

        let overrides = [
            (&mut form.business_name, self.company_name, "Your Business"),
            (&mut form.industry, self.industry, "Technology"),
            (
                &mut form.target_audience,
                self.target_audience,
                "General Audience",
            ),
            (
                &mut form.key_message,
                self.key_message,
                "Transform your business today",
            ),
            (&mut form.call_to_action, self.call_to_action, "Get Started"),
            (&mut form.cta_link, self.cta_link, "#"),
        ];
        for (field, value, default) in overrides {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                *field = value;
            } else if field.trim().is_empty() {
                *field = default.to_owned();
            }
        }
        if form.ad_goal.trim().is_empty() {
            form.ad_goal = "leads".to_owned();
        }

        let package = self.package_id.unwrap_or_else(|| "pkg_basic".to_owned());
        (form, self.payment_intent_id, package)
    }
}

/// Generate the final ad after payment. With a payment-intent id the ad is
/// persisted against it; without one this renders a throwaway ad.
#[utoipa::path(
    post,
    path = "/api/intake/generate-ad",
    responses((status = 200, description = "Generated ad")),
    tags = ["intake"]
)]
#[post("/generate-ad")]
pub async fn generate_final_ad(
    state: web::Data<HttpState>,
    payload: web::Json<GenerateAdRequest>,
) -> ApiResult<HttpResponse> {
    let (form, payment_intent_id, package) = payload.into_inner().into_form_and_ids();

    let ad = match payment_intent_id {
        Some(intent_id) => {
            state
                .ad_creation
                .generate_final(&form, &package, &intent_id)
                .await?
        }
        None => state.ad_creation.generate_preview(&form).await?,
    };

    Ok(HttpResponse::Ok().json(ok(ad)))
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLeadsRequest {
    industries: Option<Vec<String>>,
    locations: Option<Vec<String>>,
    #[serde(default = "default_radius")]
    radius: u32,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_radius() -> u32 {
    50_000
}

fn default_limit() -> usize {
    10
}

/// Discover leads through the places directory.
#[utoipa::path(
    post,
    path = "/api/intake/google-leads",
    responses(
        (status = 200, description = "Discovered leads"),
        (status = 400, description = "Missing industries or locations", body = Error)
    ),
    tags = ["intake"]
)]
#[post("/google-leads")]
pub async fn generate_google_leads(
    state: web::Data<HttpState>,
    payload: web::Json<GoogleLeadsRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let (Some(industries), Some(locations)) = (request.industries, request.locations) else {
        return Err(Error::invalid_request("Industries and locations are required"));
    };

    let leads = state
        .leads
        .discover_from_places(&PlacesCriteria {
            industries,
            locations,
            radius_m: request.radius,
            limit: request.limit,
        })
        .await;

    Ok(HttpResponse::Ok().json(ok(json!({
        "leads": leads,
        "count": leads.len(),
    }))))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct InspirationRequest {
    industry: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Video inspiration for an industry.
#[utoipa::path(
    post,
    path = "/api/intake/ad-inspiration",
    responses(
        (status = 200, description = "Inspiration videos"),
        (status = 400, description = "Missing industry", body = Error)
    ),
    tags = ["intake"]
)]
#[post("/ad-inspiration")]
pub async fn get_ad_inspiration(
    state: web::Data<HttpState>,
    payload: web::Json<InspirationRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let Some(industry) = request.industry.filter(|i| !i.trim().is_empty()) else {
        return Err(Error::invalid_request("Industry is required"));
    };

    let inspiration = state
        .leads
        .ad_inspiration(&industry, &request.keywords)
        .await?;
    Ok(HttpResponse::Ok().json(ok(inspiration)))
}

/// Probe the places API key.
#[utoipa::path(
    get,
    path = "/api/intake/validate-google",
    responses((status = 200, description = "Key validity and quota")),
    tags = ["intake"]
)]
#[get("/validate-google")]
pub async fn validate_google_api(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let validation = state.leads.validate_places_key().await?;
    Ok(HttpResponse::Ok().json(ok(validation)))
}
