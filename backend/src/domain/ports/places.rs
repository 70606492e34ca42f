//! Port for the places-search directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Errors raised by places adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacesError {
    /// Network-level failure reaching the directory.
    #[error("places transport failed: {message}")]
    Transport { message: String },
    /// The directory rejected the request (auth, quota).
    #[error("places request rejected: {message}")]
    Rejected { message: String },
    /// The directory answered with an undecodable body.
    #[error("places response undecodable: {message}")]
    Decode { message: String },
}

impl PlacesError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// A business returned by the text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSummary {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Detail record for a single place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessDetails {
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<Value>,
    pub reviews: Option<Value>,
}

/// Result of probing the directory API key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyValidation {
    pub valid: bool,
    pub quota: Value,
}

/// Driving port over the places directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlacesDirectory: Send + Sync {
    async fn search_businesses(
        &self,
        query: &str,
        location: &str,
        radius_m: u32,
    ) -> Result<Vec<BusinessSummary>, PlacesError>;

    async fn business_details(
        &self,
        place_id: &str,
    ) -> Result<Option<BusinessDetails>, PlacesError>;

    async fn validate_key(&self) -> Result<KeyValidation, PlacesError>;
}

/// Fixture directory returning no businesses.
pub struct FixturePlacesDirectory;

#[async_trait]
impl PlacesDirectory for FixturePlacesDirectory {
    async fn search_businesses(
        &self,
        _query: &str,
        _location: &str,
        _radius_m: u32,
    ) -> Result<Vec<BusinessSummary>, PlacesError> {
        Ok(Vec::new())
    }

    async fn business_details(
        &self,
        _place_id: &str,
    ) -> Result<Option<BusinessDetails>, PlacesError> {
        Ok(None)
    }

    async fn validate_key(&self) -> Result<KeyValidation, PlacesError> {
        Ok(KeyValidation {
            valid: false,
            quota: serde_json::json!({ "error": "no places provider configured" }),
        })
    }
}
