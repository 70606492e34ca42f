//! Analytics API handlers.

use actix_web::{HttpResponse, get, web};

use super::ApiResult;
use super::envelope::ok;
use super::state::HttpState;

/// Dashboard aggregates over the trailing 30 days.
#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    responses((status = 200, description = "Totals, averages, and top ads")),
    tags = ["analytics"]
)]
#[get("/dashboard")]
pub async fn get_dashboard_analytics(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ok(state.analytics.dashboard().await)))
}

/// Last-hour activity snapshot.
#[utoipa::path(
    get,
    path = "/api/analytics/realtime",
    responses((status = 200, description = "Active ads and hourly counts")),
    tags = ["analytics"]
)]
#[get("/realtime")]
pub async fn get_realtime_analytics(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ok(state.analytics.realtime().await)))
}
