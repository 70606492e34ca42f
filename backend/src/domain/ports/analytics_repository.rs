//! Port for analytics event persistence and aggregation.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::analytics::{
    AdPerformance, AnalyticsEvent, DashboardSummary, EventType, RealtimeSnapshot, TopAd, safe_rate,
};

/// Persistence errors raised by analytics repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsRepositoryError {
    /// Repository connection could not be established.
    #[error("analytics repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("analytics repository query failed: {message}")]
    Query { message: String },
}

impl AnalyticsRepositoryError {
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
pub trait AnalyticsRepository: Send + Sync {
    /// Append one event. Events are never updated or deleted.
    async fn insert_event(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsRepositoryError>;

    /// Per-ad counts and rates between `start` and `end` inclusive.
    async fn ad_performance(
        &self,
        ad_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AdPerformance, AnalyticsRepositoryError>;

    /// Cross-ad aggregates over the trailing 30 days, including the top-10
    /// ads by CTR among ads with at least one impression.
    async fn dashboard(&self, now: DateTime<Utc>)
    -> Result<DashboardSummary, AnalyticsRepositoryError>;

    /// Last-hour activity scoped to events from the trailing 24 hours.
    async fn realtime(&self, now: DateTime<Utc>)
    -> Result<RealtimeSnapshot, AnalyticsRepositoryError>;
}

/// In-memory repository computing the aggregates over a `Vec`; used in tests
/// and keyless local runs.
#[derive(Default)]
pub struct FixtureAnalyticsRepository {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl FixtureAnalyticsRepository {
    fn snapshot(&self) -> Result<Vec<AnalyticsEvent>, AnalyticsRepositoryError> {
        self.events
            .lock()
            .map(|e| e.clone())
            .map_err(|e| AnalyticsRepositoryError::query(e.to_string()))
    }
}

fn count(events: &[&AnalyticsEvent], event_type: EventType) -> i64 {
    events.iter().filter(|e| e.event_type == event_type).count() as i64
}

#[async_trait]
impl AnalyticsRepository for FixtureAnalyticsRepository {
    async fn insert_event(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsRepositoryError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| AnalyticsRepositoryError::query(e.to_string()))?;
        events.push(event.clone());
        Ok(())
    }

    async fn ad_performance(
        &self,
        ad_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AdPerformance, AnalyticsRepositoryError> {
        let events = self.snapshot()?;
        let in_range: Vec<&AnalyticsEvent> = events
            .iter()
            .filter(|e| e.ad_id == ad_id && e.timestamp >= start && e.timestamp <= end)
            .collect();
        Ok(AdPerformance::from_counts(
            ad_id.to_owned(),
            count(&in_range, EventType::Impression),
            count(&in_range, EventType::Click),
            count(&in_range, EventType::Conversion),
        ))
    }

    async fn dashboard(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, AnalyticsRepositoryError> {
        let events = self.snapshot()?;
        let window_start = now - Duration::days(30);
        let in_window: Vec<&AnalyticsEvent> =
            events.iter().filter(|e| e.timestamp >= window_start).collect();

        let mut ad_ids: Vec<&str> = in_window.iter().map(|e| e.ad_id.as_str()).collect();
        ad_ids.sort_unstable();
        ad_ids.dedup();

        let impressions = count(&in_window, EventType::Impression);
        let clicks = count(&in_window, EventType::Click);
        let conversions = count(&in_window, EventType::Conversion);

        let mut top: Vec<TopAd> = ad_ids
            .iter()
            .filter_map(|ad_id| {
                let per_ad: Vec<&AnalyticsEvent> = in_window
                    .iter()
                    .filter(|e| e.ad_id == *ad_id)
                    .copied()
                    .collect();
                let ad_impressions = count(&per_ad, EventType::Impression);
                if ad_impressions == 0 {
                    return None;
                }
                Some(TopAd {
                    ad_id: (*ad_id).to_owned(),
                    ctr: safe_rate(count(&per_ad, EventType::Click), ad_impressions),
                    conversions: count(&per_ad, EventType::Conversion),
                })
            })
            .collect();
        top.sort_by(|a, b| b.ctr.partial_cmp(&a.ctr).unwrap_or(std::cmp::Ordering::Equal));
        top.truncate(10);

        Ok(DashboardSummary {
            total_ads: ad_ids.len() as i64,
            total_impressions: impressions,
            total_clicks: clicks,
            total_conversions: conversions,
            average_ctr: safe_rate(clicks, impressions),
            average_conversion_rate: safe_rate(conversions, clicks),
            top_performing_ads: top,
        })
    }

    async fn realtime(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RealtimeSnapshot, AnalyticsRepositoryError> {
        let events = self.snapshot()?;
        let day_start = now - Duration::hours(24);
        let hour_start = now - Duration::hours(1);
        let in_day: Vec<&AnalyticsEvent> =
            events.iter().filter(|e| e.timestamp >= day_start).collect();
        let in_hour: Vec<&AnalyticsEvent> = in_day
            .iter()
            .filter(|e| e.timestamp >= hour_start)
            .copied()
            .collect();

        let mut ad_ids: Vec<&str> = in_day.iter().map(|e| e.ad_id.as_str()).collect();
        ad_ids.sort_unstable();
        ad_ids.dedup();

        Ok(RealtimeSnapshot {
            active_ads: ad_ids.len() as i64,
            impressions_last_hour: count(&in_hour, EventType::Impression),
            clicks_last_hour: count(&in_hour, EventType::Click),
            conversions_last_hour: count(&in_hour, EventType::Conversion),
        })
    }
}
