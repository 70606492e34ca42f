//! Liveness probe.

use std::time::Instant;

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde_json::json;

/// Process health shared with the probe handler.
pub struct HealthState {
    started: Instant,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl HealthState {
    /// Health state anchored at process start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the process started.
    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Liveness probe for orchestrators and load balancers.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is alive")),
    tags = ["health"]
)]
#[get("/health")]
pub async fn health(state: web::Data<HealthState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.uptime_seconds(),
    }))
}
