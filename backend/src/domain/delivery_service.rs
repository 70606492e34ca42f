//! Delivery dispatcher: embed-code synthesis behind a stub boundary.
//!
//! No bytes reach any third-party site. Each method synthesises its embed
//! snippet and logs the instruction-sending step; the contract stops there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ad::Ad;
use super::templates;

/// Supported embedding mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeployMethod {
    /// Full standalone document the customer pastes into their site.
    Injection,
    /// Iframe pointing at the hosted embed endpoint.
    Iframe,
    /// Script tag that injects the ad at load time.
    Script,
}

/// Deployment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Deployed,
    Failed,
}

/// Outcome of a deployment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub id: String,
    pub website: String,
    pub method: DeployMethod,
    pub status: DeployStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The synthesised embed code for the chosen method.
    pub embed_code: String,
}

/// Synthesises embed snippets and reports deployment status.
pub struct DeliveryService {
    public_base_url: String,
}

impl DeliveryService {
    /// Create the service with the public base URL used in iframe snippets.
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
        }
    }

    /// "Deploy" an ad: synthesise the embed code for the requested method
    /// and log the instruction steps.
    pub fn deploy(&self, ad: &Ad, website: &str, method: DeployMethod) -> DeliveryReport {
        let id = format!("target_{}", Uuid::new_v4().simple());

        if website.trim().is_empty() {
            return DeliveryReport {
                id,
                website: website.to_owned(),
                method,
                status: DeployStatus::Failed,
                deployed_at: None,
                error: Some("target website must not be empty".to_owned()),
                embed_code: String::new(),
            };
        }

        let embed_code = match method {
            DeployMethod::Injection => templates::embed_document(ad),
            DeployMethod::Iframe => templates::iframe_snippet(&ad.id, &self.public_base_url),
            DeployMethod::Script => templates::script_snippet(ad),
        };

        info!(ad_id = %ad.id, website, ?method, "sending deployment instructions");

        DeliveryReport {
            id,
            website: website.to_owned(),
            method,
            status: DeployStatus::Deployed,
            deployed_at: Some(Utc::now()),
            error: None,
            embed_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ad::AdMetadata;

    fn ad() -> Ad {
        Ad {
            id: "ad_t".into(),
            payment_intent_id: None,
            html: "<div>ad</div>".into(),
            css: ".x{}".into(),
            javascript: "(function(){})();".into(),
            preview: String::new(),
            metadata: AdMetadata {
                package: "pkg_basic".into(),
                brand_compliant: true,
                estimated_ctr: 2.5,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn iframe_deploy_points_at_the_embed_endpoint() {
        let service = DeliveryService::new("https://ads.example.com");
        let report = service.deploy(&ad(), "https://customer.example", DeployMethod::Iframe);
        assert_eq!(report.status, DeployStatus::Deployed);
        assert!(report.deployed_at.is_some());
        assert!(report.embed_code.contains("/api/embed/ad_t"));
    }

    #[test]
    fn injection_deploy_ships_the_full_document() {
        let service = DeliveryService::new("https://ads.example.com");
        let report = service.deploy(&ad(), "https://customer.example", DeployMethod::Injection);
        assert!(report.embed_code.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn script_deploy_wraps_the_ad_in_a_script_tag() {
        let service = DeliveryService::new("https://ads.example.com");
        let report = service.deploy(&ad(), "https://customer.example", DeployMethod::Script);
        assert!(report.embed_code.trim_start().starts_with("<script>"));
    }

    #[test]
    fn blank_website_fails_without_embed_code() {
        let service = DeliveryService::new("https://ads.example.com");
        let report = service.deploy(&ad(), "   ", DeployMethod::Iframe);
        assert_eq!(report.status, DeployStatus::Failed);
        assert!(report.error.is_some());
        assert!(report.embed_code.is_empty());
    }
}
