//! Port for ad persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ad::{Ad, AdMetadata};

/// Persistence errors raised by ad repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdRepositoryError {
    /// Repository connection could not be established.
    #[error("ad repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("ad repository query failed: {message}")]
    Query { message: String },
}

impl AdRepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Listing row: everything but the three blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    pub preview: String,
    pub metadata: AdMetadata,
    pub created_at: DateTime<Utc>,
}

/// A page of ads plus the total row count for pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct AdPage {
    pub ads: Vec<AdSummary>,
    pub total: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdRepository: Send + Sync {
    /// Insert a generated ad. Ads are immutable; there is no update path.
    async fn insert(&self, ad: &Ad) -> Result<(), AdRepositoryError>;

    /// Fetch an ad by identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<Ad>, AdRepositoryError>;

    /// Newest-first page of ad summaries.
    async fn list(&self, page: i64, limit: i64) -> Result<AdPage, AdRepositoryError>;
}

/// In-memory repository for tests and keyless local runs.
#[derive(Default)]
pub struct FixtureAdRepository {
    ads: Mutex<HashMap<String, Ad>>,
}

#[async_trait]
impl AdRepository for FixtureAdRepository {
    async fn insert(&self, ad: &Ad) -> Result<(), AdRepositoryError> {
        let mut ads = self.ads.lock().map_err(|e| AdRepositoryError::query(e.to_string()))?;
        ads.insert(ad.id.clone(), ad.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Ad>, AdRepositoryError> {
        let ads = self.ads.lock().map_err(|e| AdRepositoryError::query(e.to_string()))?;
        Ok(ads.get(id).cloned())
    }

    async fn list(&self, page: i64, limit: i64) -> Result<AdPage, AdRepositoryError> {
        let ads = self.ads.lock().map_err(|e| AdRepositoryError::query(e.to_string()))?;
        let mut all: Vec<&Ad> = ads.values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let offset = ((page.max(1) - 1) * limit.max(0)) as usize;
        let summaries = all
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .map(|ad| AdSummary {
                id: ad.id.clone(),
                payment_intent_id: ad.payment_intent_id.clone(),
                preview: ad.preview.clone(),
                metadata: ad.metadata.clone(),
                created_at: ad.created_at,
            })
            .collect();
        Ok(AdPage {
            ads: summaries,
            total: ads.len() as i64,
        })
    }
}
