//! Port for lead persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::lead::{Lead, LeadStatus};

/// Persistence errors raised by lead repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadRepositoryError {
    /// Repository connection could not be established.
    #[error("lead repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("lead repository query failed: {message}")]
    Query { message: String },
}

impl LeadRepositoryError {
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

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Insert the lead, or refresh every mutable column when the id already
    /// exists (places-sourced ids are stable across discovery runs).
    async fn upsert(&self, lead: &Lead) -> Result<(), LeadRepositoryError>;

    /// Advance a lead's lifecycle status.
    async fn update_status(
        &self,
        lead_id: &str,
        status: LeadStatus,
    ) -> Result<(), LeadRepositoryError>;
}

/// In-memory repository for tests and keyless local runs.
#[derive(Default)]
pub struct FixtureLeadRepository {
    leads: Mutex<HashMap<String, Lead>>,
}

impl FixtureLeadRepository {
    /// Number of stored leads (test observability).
    pub fn lead_count(&self) -> usize {
        self.leads.lock().map(|l| l.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LeadRepository for FixtureLeadRepository {
    async fn upsert(&self, lead: &Lead) -> Result<(), LeadRepositoryError> {
        let mut leads = self
            .leads
            .lock()
            .map_err(|e| LeadRepositoryError::query(e.to_string()))?;
        leads.insert(lead.id.clone(), lead.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        lead_id: &str,
        status: LeadStatus,
    ) -> Result<(), LeadRepositoryError> {
        let mut leads = self
            .leads
            .lock()
            .map_err(|e| LeadRepositoryError::query(e.to_string()))?;
        if let Some(lead) = leads.get_mut(lead_id) {
            lead.status = status;
        }
        Ok(())
    }
}
