//! Ad API handlers: lookup, listing, performance, deployment, and event
//! tracking.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::domain::Error;
use crate::domain::analytics::EventType;
use crate::domain::analytics_service::EventContext;
use crate::domain::delivery_service::DeployMethod;

use super::ApiResult;
use super::envelope::ok;
use super::state::HttpState;

async fn load_ad(state: &HttpState, ad_id: &str) -> Result<crate::domain::ad::Ad, Error> {
    state
        .ads
        .find_by_id(ad_id)
        .await
        .map_err(|err| Error::internal(format!("ad lookup failed: {err}")))?
        .ok_or_else(|| Error::not_found("Ad not found"))
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// Newest-first ad listing with pagination.
#[utoipa::path(
    get,
    path = "/api/ads",
    responses((status = 200, description = "Page of ads")),
    tags = ["ads"]
)]
#[get("")]
pub async fn list_ads(
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let result = state
        .ads
        .list(page, limit)
        .await
        .map_err(|err| Error::internal(format!("ad listing failed: {err}")))?;

    let pages = (result.total + limit - 1) / limit;
    Ok(HttpResponse::Ok().json(ok(json!({
        "ads": result.ads,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": result.total,
            "pages": pages,
        },
    }))))
}

/// Fetch a single ad with its blobs.
#[utoipa::path(
    get,
    path = "/api/ads/{adId}",
    responses(
        (status = 200, description = "The ad"),
        (status = 404, description = "Unknown ad", body = Error)
    ),
    tags = ["ads"]
)]
#[get("/{ad_id}")]
pub async fn get_ad(state: web::Data<HttpState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let ad = load_ad(&state, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ok(ad)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceQuery {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

/// Per-ad performance metrics. Unknown ads come back zeroed, not as errors.
#[utoipa::path(
    get,
    path = "/api/ads/{adId}/performance",
    responses((status = 200, description = "Counts and rates")),
    tags = ["ads"]
)]
#[get("/{ad_id}/performance")]
pub async fn get_ad_performance(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PerformanceQuery>,
) -> ApiResult<HttpResponse> {
    let performance = state
        .analytics
        .ad_performance(&path.into_inner(), query.start_date, query.end_date)
        .await;
    Ok(HttpResponse::Ok().json(ok(performance)))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct DeployRequest {
    website: Option<String>,
    method: Option<DeployMethod>,
}

/// "Deploy" an ad: synthesise the embed code for the chosen method.
#[utoipa::path(
    post,
    path = "/api/ads/{adId}/deploy",
    responses(
        (status = 200, description = "Deployment report"),
        (status = 400, description = "Missing website or method", body = Error),
        (status = 404, description = "Unknown ad", body = Error)
    ),
    tags = ["ads"]
)]
#[post("/{ad_id}/deploy")]
pub async fn deploy_ad(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<DeployRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let (Some(website), Some(method)) = (request.website, request.method) else {
        return Err(Error::invalid_request("Website and method are required"));
    };

    let ad = load_ad(&state, &path.into_inner()).await?;
    let report = state.delivery.deploy(&ad, &website, method);
    Ok(HttpResponse::Ok().json(ok(report)))
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    url: Option<String>,
    referrer: Option<String>,
    user_agent: Option<String>,
    metadata: Option<serde_json::Value>,
}

/// Track an interaction event. The event type rides in the path; unknown
/// types are rejected before anything is written.
#[utoipa::path(
    post,
    path = "/api/ads/{adId}/track/{eventType}",
    responses(
        (status = 200, description = "Event recorded (best effort)"),
        (status = 400, description = "Unknown event type", body = Error)
    ),
    tags = ["ads"]
)]
#[post("/{ad_id}/track/{event_type}")]
pub async fn track_event(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    payload: Option<web::Json<TrackRequest>>,
) -> ApiResult<HttpResponse> {
    let (ad_id, event_type) = path.into_inner();
    let event_type = EventType::parse(&event_type)
        .ok_or_else(|| Error::invalid_request(format!("unknown event type: {event_type}")))?;

    let request = payload.map(web::Json::into_inner).unwrap_or_default();
    let header = |name: actix_web::http::header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    let context = EventContext {
        url: request
            .url
            .or_else(|| header(actix_web::http::header::REFERER)),
        referrer: request
            .referrer
            .or_else(|| header(actix_web::http::header::REFERER)),
        user_agent: request
            .user_agent
            .or_else(|| header(actix_web::http::header::USER_AGENT)),
        ip_address: req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_owned),
        metadata: request.metadata,
    };

    state.analytics.track(&ad_id, event_type, context).await;
    Ok(HttpResponse::Ok().json(ok(json!({ "message": "Event tracked successfully" }))))
}
