//! PostgreSQL-backed [`LeadRepository`] implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::lead::{Lead, LeadStatus};
use crate::domain::ports::{LeadRepository, LeadRepositoryError};

use super::models::NewLeadRow;
use super::pool::{DbPool, PoolError};
use super::schema::leads;

/// Diesel adapter for the lead store.
#[derive(Clone)]
pub struct DieselLeadRepository {
    pool: DbPool,
}

impl DieselLeadRepository {
    /// Create the repository over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LeadRepositoryError {
    LeadRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> LeadRepositoryError {
    debug!(error = %error, "leads query failed");
    LeadRepositoryError::query(error.to_string())
}

#[async_trait]
impl LeadRepository for DieselLeadRepository {
    async fn upsert(&self, lead: &Lead) -> Result<(), LeadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewLeadRow {
            id: &lead.id,
            company_name: &lead.company_name,
            website: &lead.website,
            industry: &lead.industry,
            contact_email: lead.contact_email.as_deref(),
            contact_name: lead.contact_name.as_deref(),
            estimated_size: lead.estimated_size.as_str(),
            source: lead.source.as_str(),
            status: lead.status.as_str(),
            metadata: &lead.metadata,
            created_at: lead.created_at,
            updated_at: lead.created_at,
        };

        // Places-sourced ids are stable across discovery runs; a re-discovered
        // lead refreshes every mutable column.
        diesel::insert_into(leads::table)
            .values(&row)
            .on_conflict(leads::id)
            .do_update()
            .set((
                leads::company_name.eq(&lead.company_name),
                leads::website.eq(&lead.website),
                leads::industry.eq(&lead.industry),
                leads::contact_email.eq(lead.contact_email.as_deref()),
                leads::contact_name.eq(lead.contact_name.as_deref()),
                leads::estimated_size.eq(lead.estimated_size.as_str()),
                leads::source.eq(lead.source.as_str()),
                leads::status.eq(lead.status.as_str()),
                leads::metadata.eq(&lead.metadata),
                leads::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_status(
        &self,
        lead_id: &str,
        status: LeadStatus,
    ) -> Result<(), LeadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(leads::table.filter(leads::id.eq(lead_id)))
            .set((
                leads::status.eq(status.as_str()),
                leads::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_map_to_connection_variant() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, LeadRepositoryError::Connection { .. }));
    }

    #[test]
    fn diesel_errors_map_to_query_variant() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, LeadRepositoryError::Query { .. }));
    }
}
