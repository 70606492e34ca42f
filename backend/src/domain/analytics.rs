//! Analytics events and aggregate shapes.
//!
//! Rate maths lives here so every read path shares the same zero-safe
//! behaviour: a zero denominator yields 0, never NaN or infinity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of tracked interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Impression,
    Click,
    Close,
    Conversion,
}

impl EventType {
    /// Wire/database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Impression => "impression",
            Self::Click => "click",
            Self::Close => "close",
            Self::Conversion => "conversion",
        }
    }

    /// Parse a path/wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "impression" => Some(Self::Impression),
            "click" => Some(Self::Click),
            "close" => Some(Self::Close),
            "conversion" => Some(Self::Conversion),
            _ => None,
        }
    }
}

/// Append-only tracked event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: String,
    pub ad_id: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub metadata: Value,
}

impl AnalyticsEvent {
    /// Generate a fresh event identifier.
    pub fn generate_id() -> String {
        format!("event_{}", Uuid::new_v4().simple())
    }
}

/// Percentage rate guarded against an empty denominator.
pub fn safe_rate(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Per-ad performance over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdPerformance {
    pub ad_id: String,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub ctr: f64,
    pub conversion_rate: f64,
}

impl AdPerformance {
    /// Build a performance record from raw counts, deriving both rates.
    pub fn from_counts(ad_id: String, impressions: i64, clicks: i64, conversions: i64) -> Self {
        Self {
            ad_id,
            impressions,
            clicks,
            conversions,
            ctr: safe_rate(clicks, impressions),
            conversion_rate: safe_rate(conversions, clicks),
        }
    }

    /// All-zero record for an ad with no events (or a failed read).
    pub fn zeroed(ad_id: String) -> Self {
        Self::from_counts(ad_id, 0, 0, 0)
    }
}

/// One entry in the dashboard's top-performing list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopAd {
    pub ad_id: String,
    pub ctr: f64,
    pub conversions: i64,
}

/// Cross-ad dashboard aggregates over the fixed 30-day window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_ads: i64,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub total_conversions: i64,
    pub average_ctr: f64,
    pub average_conversion_rate: f64,
    pub top_performing_ads: Vec<TopAd>,
}

/// Last-hour activity scoped to the trailing day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeSnapshot {
    pub active_ads: i64,
    pub impressions_last_hour: i64,
    pub clicks_last_hour: i64,
    pub conversions_last_hour: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(5, 0, 0.0)]
    #[case(1, 4, 25.0)]
    #[case(3, 3, 100.0)]
    fn safe_rate_never_divides_by_zero(
        #[case] numerator: i64,
        #[case] denominator: i64,
        #[case] expected: f64,
    ) {
        let rate = safe_rate(numerator, denominator);
        assert!(rate.is_finite());
        assert_eq!(rate, expected);
    }

    #[test]
    fn performance_rates_derive_from_counts() {
        let perf = AdPerformance::from_counts("ad_1".into(), 200, 10, 1);
        assert_eq!(perf.ctr, 5.0);
        assert_eq!(perf.conversion_rate, 10.0);
    }

    #[test]
    fn zeroed_performance_is_all_zero_and_finite() {
        let perf = AdPerformance::zeroed("missing".into());
        assert_eq!(perf.impressions, 0);
        assert_eq!(perf.ctr, 0.0);
        assert_eq!(perf.conversion_rate, 0.0);
    }

    #[test]
    fn event_type_parse_rejects_unknown() {
        assert_eq!(EventType::parse("impression"), Some(EventType::Impression));
        assert_eq!(EventType::parse("hover"), None);
    }
}
