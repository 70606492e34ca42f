//! PostgreSQL-backed [`AdRepository`] implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ad::{Ad, AdMetadata};
use crate::domain::ports::{AdPage, AdRepository, AdRepositoryError, AdSummary};

use super::models::{AdRow, AdSummaryRow, NewAdRow};
use super::pool::{DbPool, PoolError};
use super::schema::ads;

/// Diesel adapter for the ad store.
#[derive(Clone)]
pub struct DieselAdRepository {
    pool: DbPool,
}

impl DieselAdRepository {
    /// Create the repository over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdRepositoryError {
    AdRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> AdRepositoryError {
    debug!(error = %error, "ads query failed");
    AdRepositoryError::query(error.to_string())
}

fn metadata_from_value(value: serde_json::Value) -> AdMetadata {
    serde_json::from_value(value).unwrap_or(AdMetadata {
        package: "unknown".to_owned(),
        brand_compliant: false,
        estimated_ctr: 0.0,
    })
}

fn row_to_ad(row: AdRow) -> Ad {
    Ad {
        id: row.id,
        payment_intent_id: row.payment_intent_id,
        html: row.html,
        css: row.css,
        javascript: row.javascript,
        preview: row.preview,
        metadata: metadata_from_value(row.metadata),
        created_at: row.created_at,
    }
}

fn row_to_summary(row: AdSummaryRow) -> AdSummary {
    AdSummary {
        id: row.id,
        payment_intent_id: row.payment_intent_id,
        preview: row.preview,
        metadata: metadata_from_value(row.metadata),
        created_at: row.created_at,
    }
}

#[async_trait]
impl AdRepository for DieselAdRepository {
    async fn insert(&self, ad: &Ad) -> Result<(), AdRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let metadata = serde_json::to_value(&ad.metadata)
            .map_err(|err| AdRepositoryError::query(format!("metadata serialization: {err}")))?;

        let row = NewAdRow {
            id: &ad.id,
            payment_intent_id: ad.payment_intent_id.as_deref(),
            html: &ad.html,
            css: &ad.css,
            javascript: &ad.javascript,
            preview: &ad.preview,
            metadata: &metadata,
            created_at: ad.created_at,
        };

        diesel::insert_into(ads::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Ad>, AdRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AdRow> = ads::table
            .filter(ads::id.eq(id))
            .select(AdRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_ad))
    }

    async fn list(&self, page: i64, limit: i64) -> Result<AdPage, AdRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let page = page.max(1);
        let limit = limit.clamp(0, 100);
        let offset = (page - 1) * limit;

        let rows: Vec<AdSummaryRow> = ads::table
            .order(ads::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select(AdSummaryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let total: i64 = ads::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(AdPage {
            ads: rows.into_iter().map(row_to_summary).collect(),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_metadata_degrades_to_placeholder() {
        let metadata = metadata_from_value(serde_json::json!({ "unexpected": true }));
        assert_eq!(metadata.package, "unknown");
        assert!(!metadata.brand_compliant);
    }

    #[test]
    fn stored_metadata_round_trips() {
        let original = AdMetadata {
            package: "pkg_pro".into(),
            brand_compliant: true,
            estimated_ctr: 2.5,
        };
        let value = serde_json::to_value(&original).expect("serialize");
        assert_eq!(metadata_from_value(value), original);
    }
}
