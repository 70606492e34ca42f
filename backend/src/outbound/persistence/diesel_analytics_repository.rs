//! PostgreSQL-backed [`AnalyticsRepository`] implementation.
//!
//! Aggregations run as raw SQL: filtered counts over `analytics_events` with
//! the rate maths done in the domain so zero denominators behave identically
//! across adapters.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Double, Int8, Nullable, Timestamptz, Varchar};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::analytics::{
    AdPerformance, AnalyticsEvent, DashboardSummary, RealtimeSnapshot, TopAd, safe_rate,
};
use crate::domain::ports::{AnalyticsRepository, AnalyticsRepositoryError};

use super::models::NewEventRow;
use super::pool::{DbPool, PoolError};
use super::schema::analytics_events;

/// Diesel adapter for the analytics store.
#[derive(Clone)]
pub struct DieselAnalyticsRepository {
    pool: DbPool,
}

impl DieselAnalyticsRepository {
    /// Create the repository over a shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AnalyticsRepositoryError {
    AnalyticsRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> AnalyticsRepositoryError {
    debug!(error = %error, "analytics query failed");
    AnalyticsRepositoryError::query(error.to_string())
}

#[derive(QueryableByName)]
struct CountsRow {
    #[diesel(sql_type = Int8)]
    impressions: i64,
    #[diesel(sql_type = Int8)]
    clicks: i64,
    #[diesel(sql_type = Int8)]
    conversions: i64,
}

#[derive(QueryableByName)]
struct DashboardTotalsRow {
    #[diesel(sql_type = Int8)]
    total_ads: i64,
    #[diesel(sql_type = Int8)]
    impressions: i64,
    #[diesel(sql_type = Int8)]
    clicks: i64,
    #[diesel(sql_type = Int8)]
    conversions: i64,
}

#[derive(QueryableByName)]
struct TopAdRow {
    #[diesel(sql_type = Varchar)]
    ad_id: String,
    #[diesel(sql_type = Nullable<Double>)]
    ctr: Option<f64>,
    #[diesel(sql_type = Int8)]
    conversions: i64,
}

#[derive(QueryableByName)]
struct RealtimeRow {
    #[diesel(sql_type = Int8)]
    active_ads: i64,
    #[diesel(sql_type = Int8)]
    impressions_last_hour: i64,
    #[diesel(sql_type = Int8)]
    clicks_last_hour: i64,
    #[diesel(sql_type = Int8)]
    conversions_last_hour: i64,
}

#[async_trait]
impl AnalyticsRepository for DieselAnalyticsRepository {
    async fn insert_event(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewEventRow {
            id: &event.id,
            ad_id: &event.ad_id,
            event_type: event.event_type.as_str(),
            timestamp: event.timestamp,
            url: &event.url,
            referrer: event.referrer.as_deref(),
            user_agent: event.user_agent.as_deref(),
            ip_address: event.ip_address.as_deref(),
            metadata: &event.metadata,
        };

        diesel::insert_into(analytics_events::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn ad_performance(
        &self,
        ad_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AdPerformance, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let counts: CountsRow = diesel::sql_query(
            "SELECT \
                 COUNT(*) FILTER (WHERE event_type = 'impression') AS impressions, \
                 COUNT(*) FILTER (WHERE event_type = 'click') AS clicks, \
                 COUNT(*) FILTER (WHERE event_type = 'conversion') AS conversions \
             FROM analytics_events \
             WHERE ad_id = $1 AND timestamp >= $2 AND timestamp <= $3",
        )
        .bind::<Varchar, _>(ad_id)
        .bind::<Timestamptz, _>(start)
        .bind::<Timestamptz, _>(end)
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(AdPerformance::from_counts(
            ad_id.to_owned(),
            counts.impressions,
            counts.clicks,
            counts.conversions,
        ))
    }

    async fn dashboard(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let window_start = now - Duration::days(30);

        let totals: DashboardTotalsRow = diesel::sql_query(
            "SELECT \
                 COUNT(DISTINCT ad_id) AS total_ads, \
                 COUNT(*) FILTER (WHERE event_type = 'impression') AS impressions, \
                 COUNT(*) FILTER (WHERE event_type = 'click') AS clicks, \
                 COUNT(*) FILTER (WHERE event_type = 'conversion') AS conversions \
             FROM analytics_events \
             WHERE timestamp >= $1",
        )
        .bind::<Timestamptz, _>(window_start)
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        let top_rows: Vec<TopAdRow> = diesel::sql_query(
            "SELECT ad_id, \
                 COUNT(*) FILTER (WHERE event_type = 'click')::float8 / \
                     NULLIF(COUNT(*) FILTER (WHERE event_type = 'impression'), 0) * 100 AS ctr, \
                 COUNT(*) FILTER (WHERE event_type = 'conversion') AS conversions \
             FROM analytics_events \
             WHERE timestamp >= $1 \
             GROUP BY ad_id \
             HAVING COUNT(*) FILTER (WHERE event_type = 'impression') > 0 \
             ORDER BY ctr DESC \
             LIMIT 10",
        )
        .bind::<Timestamptz, _>(window_start)
        .load(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(DashboardSummary {
            total_ads: totals.total_ads,
            total_impressions: totals.impressions,
            total_clicks: totals.clicks,
            total_conversions: totals.conversions,
            average_ctr: safe_rate(totals.clicks, totals.impressions),
            average_conversion_rate: safe_rate(totals.conversions, totals.clicks),
            top_performing_ads: top_rows
                .into_iter()
                .map(|row| TopAd {
                    ad_id: row.ad_id,
                    ctr: row.ctr.unwrap_or(0.0),
                    conversions: row.conversions,
                })
                .collect(),
        })
    }

    async fn realtime(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RealtimeSnapshot, AnalyticsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let day_start = now - Duration::hours(24);
        let hour_start = now - Duration::hours(1);

        let row: RealtimeRow = diesel::sql_query(
            "SELECT \
                 COUNT(DISTINCT ad_id) AS active_ads, \
                 COUNT(*) FILTER (WHERE event_type = 'impression' AND timestamp >= $2) \
                     AS impressions_last_hour, \
                 COUNT(*) FILTER (WHERE event_type = 'click' AND timestamp >= $3) \
                     AS clicks_last_hour, \
                 COUNT(*) FILTER (WHERE event_type = 'conversion' AND timestamp >= $4) \
                     AS conversions_last_hour \
             FROM analytics_events \
             WHERE timestamp >= $1",
        )
        .bind::<Timestamptz, _>(day_start)
        .bind::<Timestamptz, _>(hour_start)
        .bind::<Timestamptz, _>(hour_start)
        .bind::<Timestamptz, _>(hour_start)
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(RealtimeSnapshot {
            active_ads: row.active_ads,
            impressions_last_hour: row.impressions_last_hour,
            clicks_last_hour: row.clicks_last_hour,
            conversions_last_hour: row.conversions_last_hour,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_map_to_connection_variant() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, AnalyticsRepositoryError::Connection { .. }));
    }

    #[test]
    fn diesel_errors_map_to_query_variant() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, AnalyticsRepositoryError::Query { .. }));
    }
}
