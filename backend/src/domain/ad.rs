//! Generated ad aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Metadata recorded alongside a generated ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdMetadata {
    /// Package tier the ad was generated for (`preview` before purchase).
    pub package: String,
    pub brand_compliant: bool,
    pub estimated_ctr: f64,
}

/// A generated popup ad. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: String,
    /// External payment-intent id the ad was purchased under, when final.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    pub html: String,
    pub css: String,
    pub javascript: String,
    /// Base64 preview image placeholder.
    pub preview: String,
    pub metadata: AdMetadata,
    pub created_at: DateTime<Utc>,
}

impl Ad {
    /// Generate a fresh ad identifier.
    pub fn generate_id() -> String {
        format!("ad_{}", Uuid::new_v4().simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let a = Ad::generate_id();
        let b = Ad::generate_id();
        assert!(a.starts_with("ad_"));
        assert_ne!(a, b);
    }
}
