//! Ad embed endpoint: serves the standalone HTML document.

use actix_web::{HttpResponse, get, web};

use crate::domain::templates::embed_document;

use super::state::HttpState;

/// Serve an ad as a standalone HTML document.
///
/// Not JSON-enveloped: iframes load this directly. The body must be
/// byte-identical to the download endpoint's document for the same ad.
#[utoipa::path(
    get,
    path = "/api/embed/{adId}",
    responses(
        (status = 200, description = "Standalone ad document", content_type = "text/html"),
        (status = 404, description = "Unknown ad", content_type = "text/plain")
    ),
    tags = ["embed"]
)]
#[get("/api/embed/{ad_id}")]
pub async fn embed_ad(state: web::Data<HttpState>, path: web::Path<String>) -> HttpResponse {
    let ad_id = path.into_inner();
    match state.ads.find_by_id(&ad_id).await {
        Ok(Some(ad)) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(embed_document(&ad)),
        Ok(None) => HttpResponse::NotFound().body("Ad not found"),
        Err(err) => {
            tracing::error!(ad_id, error = %err, "embed lookup failed");
            HttpResponse::InternalServerError().body("Error loading ad")
        }
    }
}
