//! Port for video search used by the ad-inspiration flow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::places::PlacesError;

/// A video surfaced for inspiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub published_at: String,
}

/// Engagement statistics for a single video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoStats {
    pub view_count: String,
    pub like_count: String,
    pub comment_count: String,
    pub duration: String,
}

/// Driving port over the video-search API. Shares the places error type: both
/// live behind the same provider key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoInspiration: Send + Sync {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u8,
    ) -> Result<Vec<VideoSummary>, PlacesError>;

    async fn video_stats(&self, video_id: &str) -> Result<Option<VideoStats>, PlacesError>;
}

/// Fixture source returning no videos.
pub struct FixtureVideoInspiration;

#[async_trait]
impl VideoInspiration for FixtureVideoInspiration {
    async fn search_videos(
        &self,
        _query: &str,
        _max_results: u8,
    ) -> Result<Vec<VideoSummary>, PlacesError> {
        Ok(Vec::new())
    }

    async fn video_stats(&self, _video_id: &str) -> Result<Option<VideoStats>, PlacesError> {
        Ok(None)
    }
}
