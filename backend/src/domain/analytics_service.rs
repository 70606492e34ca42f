//! Analytics facade with the "always respond" policy.
//!
//! Reads degrade to zeroed shapes when the repository fails; the failure is
//! logged and the API keeps answering. Writes are best-effort: a lost event
//! must never fail the caller's request.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{error, warn};

use super::analytics::{
    AdPerformance, AnalyticsEvent, DashboardSummary, EventType, RealtimeSnapshot,
};
use super::ports::AnalyticsRepository;

/// Optional request context captured alongside a tracked event.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    pub url: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: Option<Value>,
}

/// Read/write facade over the analytics repository.
pub struct AnalyticsService {
    repo: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    /// Create the service over its repository port.
    pub fn new(repo: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repo }
    }

    /// Record an interaction. Persistence failures are logged and swallowed:
    /// tracking is fire-and-forget by contract.
    pub async fn track(&self, ad_id: &str, event_type: EventType, context: EventContext) {
        let event = AnalyticsEvent {
            id: AnalyticsEvent::generate_id(),
            ad_id: ad_id.to_owned(),
            event_type,
            timestamp: Utc::now(),
            url: context.url.unwrap_or_else(|| "unknown".to_owned()),
            referrer: context.referrer,
            user_agent: context.user_agent,
            ip_address: context.ip_address,
            metadata: context.metadata.unwrap_or(Value::Null),
        };
        if let Err(err) = self.repo.insert_event(&event).await {
            warn!(ad_id, error = %err, "failed to track analytics event");
        }
    }

    /// Per-ad performance; the window defaults to the trailing 30 days.
    /// An unknown ad id or a failed read both come back zeroed.
    pub async fn ad_performance(
        &self,
        ad_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AdPerformance {
        let end = end.unwrap_or_else(Utc::now);
        let start = start.unwrap_or_else(|| end - Duration::days(30));
        match self.repo.ad_performance(ad_id, start, end).await {
            Ok(performance) => performance,
            Err(err) => {
                error!(ad_id, error = %err, "ad performance query failed; returning zeroes");
                AdPerformance::zeroed(ad_id.to_owned())
            }
        }
    }

    /// Dashboard aggregates over the fixed 30-day window.
    pub async fn dashboard(&self) -> DashboardSummary {
        match self.repo.dashboard(Utc::now()).await {
            Ok(summary) => summary,
            Err(err) => {
                error!(error = %err, "dashboard query failed; returning zeroes");
                DashboardSummary::default()
            }
        }
    }

    /// Last-hour snapshot.
    pub async fn realtime(&self) -> RealtimeSnapshot {
        match self.repo.realtime(Utc::now()).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(error = %err, "realtime query failed; returning zeroes");
                RealtimeSnapshot::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        AnalyticsRepositoryError, FixtureAnalyticsRepository, MockAnalyticsRepository,
    };

    fn failing_repo() -> MockAnalyticsRepository {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_ad_performance()
            .returning(|_, _, _| Err(AnalyticsRepositoryError::connection("db down")));
        repo.expect_dashboard()
            .returning(|_| Err(AnalyticsRepositoryError::connection("db down")));
        repo.expect_realtime()
            .returning(|_| Err(AnalyticsRepositoryError::connection("db down")));
        repo.expect_insert_event()
            .returning(|_| Err(AnalyticsRepositoryError::query("insert failed")));
        repo
    }

    #[tokio::test]
    async fn failed_reads_return_zeroed_shapes() {
        let service = AnalyticsService::new(Arc::new(failing_repo()));

        let perf = service.ad_performance("ad_1", None, None).await;
        assert_eq!(perf, AdPerformance::zeroed("ad_1".into()));
        assert_eq!(service.dashboard().await, DashboardSummary::default());
        assert_eq!(service.realtime().await, RealtimeSnapshot::default());
    }

    #[tokio::test]
    async fn track_swallows_persistence_failures() {
        let service = AnalyticsService::new(Arc::new(failing_repo()));
        // Must not panic or surface the error.
        service
            .track("ad_1", EventType::Impression, EventContext::default())
            .await;
    }

    #[tokio::test]
    async fn unknown_ad_id_yields_zeroes_without_error() {
        let service = AnalyticsService::new(Arc::new(FixtureAnalyticsRepository::default()));
        let perf = service.ad_performance("nonexistent-ad-id", None, None).await;
        assert_eq!(perf.impressions, 0);
        assert_eq!(perf.clicks, 0);
        assert_eq!(perf.conversions, 0);
        assert_eq!(perf.ctr, 0.0);
        assert_eq!(perf.conversion_rate, 0.0);
    }

    #[tokio::test]
    async fn dashboard_is_idempotent_without_new_events() {
        let repo = Arc::new(FixtureAnalyticsRepository::default());
        let service = AnalyticsService::new(repo);
        service
            .track("ad_1", EventType::Impression, EventContext::default())
            .await;
        service
            .track("ad_1", EventType::Click, EventContext::default())
            .await;

        let first = service.dashboard().await;
        let second = service.dashboard().await;
        assert_eq!(first, second);
    }
}
