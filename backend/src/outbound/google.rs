//! Reqwest-backed adapter for the Google Places and YouTube Data APIs.
//!
//! One client, one API key, two ports: [`PlacesDirectory`] for business
//! discovery and [`VideoInspiration`] for the ad-inspiration flow.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::domain::ports::{
    BusinessDetails, BusinessSummary, KeyValidation, PlacesDirectory, PlacesError, VideoInspiration,
    VideoStats, VideoSummary,
};

const PLACES_TEXTSEARCH_URL: &str =
    "https://maps.googleapis.com/maps/api/place/textsearch/json";
const PLACES_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const YOUTUBE_VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,website,rating,user_ratings_total,opening_hours,reviews";

/// Google API adapter holding the shared key.
pub struct GoogleApiClient {
    client: Client,
    api_key: String,
    places_textsearch_url: String,
    places_details_url: String,
    youtube_search_url: String,
    youtube_videos_url: String,
}

impl GoogleApiClient {
    /// Build the adapter against the production endpoints.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            places_textsearch_url: PLACES_TEXTSEARCH_URL.to_owned(),
            places_details_url: PLACES_DETAILS_URL.to_owned(),
            youtube_search_url: YOUTUBE_SEARCH_URL.to_owned(),
            youtube_videos_url: YOUTUBE_VIDEOS_URL.to_owned(),
        })
    }

    /// Point every endpoint at a base URL (tests).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.places_textsearch_url = format!("{base}/maps/api/place/textsearch/json");
        self.places_details_url = format!("{base}/maps/api/place/details/json");
        self.youtube_search_url = format!("{base}/youtube/v3/search");
        self.youtube_videos_url = format!("{base}/youtube/v3/videos");
        self
    }
}

fn map_transport_error(error: reqwest::Error) -> PlacesError {
    PlacesError::transport(error.to_string())
}

fn map_decode_error(error: reqwest::Error) -> PlacesError {
    PlacesError::decode(error.to_string())
}

#[derive(Deserialize)]
struct TextSearchDto {
    #[serde(default)]
    results: Vec<TextSearchResultDto>,
    #[serde(default)]
    status: String,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct TextSearchResultDto {
    place_id: String,
    name: String,
    #[serde(default)]
    formatted_address: String,
    rating: Option<f64>,
    user_ratings_total: Option<i64>,
    geometry: Option<GeometryDto>,
}

#[derive(Deserialize)]
struct GeometryDto {
    location: LocationDto,
}

#[derive(Deserialize)]
struct LocationDto {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct DetailsDto {
    result: Option<DetailsResultDto>,
}

#[derive(Deserialize)]
struct DetailsResultDto {
    formatted_phone_number: Option<String>,
    website: Option<String>,
    opening_hours: Option<serde_json::Value>,
    reviews: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct YouTubeSearchDto {
    #[serde(default)]
    items: Vec<YouTubeSearchItemDto>,
}

#[derive(Deserialize)]
struct YouTubeSearchItemDto {
    id: YouTubeIdDto,
    snippet: YouTubeSnippetDto,
}

#[derive(Deserialize)]
struct YouTubeIdDto {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct YouTubeSnippetDto {
    title: String,
    #[serde(default)]
    description: String,
    thumbnails: Option<ThumbnailsDto>,
    #[serde(rename = "publishedAt", default)]
    published_at: String,
}

#[derive(Deserialize)]
struct ThumbnailsDto {
    high: Option<ThumbnailDto>,
}

#[derive(Deserialize)]
struct ThumbnailDto {
    url: String,
}

#[derive(Deserialize)]
struct YouTubeVideosDto {
    #[serde(default)]
    items: Vec<YouTubeVideoItemDto>,
}

#[derive(Deserialize, Default)]
struct YouTubeVideoItemDto {
    statistics: Option<YouTubeStatisticsDto>,
    #[serde(rename = "contentDetails")]
    content_details: Option<YouTubeContentDetailsDto>,
}

#[derive(Deserialize, Default)]
struct YouTubeStatisticsDto {
    #[serde(rename = "viewCount", default)]
    view_count: String,
    #[serde(rename = "likeCount", default)]
    like_count: String,
    #[serde(rename = "commentCount", default)]
    comment_count: String,
}

#[derive(Deserialize, Default)]
struct YouTubeContentDetailsDto {
    #[serde(default)]
    duration: String,
}

#[async_trait]
impl PlacesDirectory for GoogleApiClient {
    async fn search_businesses(
        &self,
        query: &str,
        location: &str,
        radius_m: u32,
    ) -> Result<Vec<BusinessSummary>, PlacesError> {
        let radius = radius_m.to_string();
        let response = self
            .client
            .get(&self.places_textsearch_url)
            .query(&[
                ("query", query),
                ("key", self.api_key.as_str()),
                ("type", "establishment"),
                ("location", location),
                ("radius", radius.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(PlacesError::rejected(format!(
                "text search answered status {}",
                response.status().as_u16()
            )));
        }

        let decoded: TextSearchDto = response.json().await.map_err(map_decode_error)?;
        if decoded.status == "REQUEST_DENIED" || decoded.status == "OVER_QUERY_LIMIT" {
            return Err(PlacesError::rejected(
                decoded.error_message.unwrap_or(decoded.status),
            ));
        }

        Ok(decoded
            .results
            .into_iter()
            .map(|result| BusinessSummary {
                place_id: result.place_id,
                name: result.name,
                address: result.formatted_address,
                rating: result.rating,
                review_count: result.user_ratings_total,
                latitude: result.geometry.as_ref().map(|g| g.location.lat),
                longitude: result.geometry.as_ref().map(|g| g.location.lng),
            })
            .collect())
    }

    async fn business_details(
        &self,
        place_id: &str,
    ) -> Result<Option<BusinessDetails>, PlacesError> {
        let response = self
            .client
            .get(&self.places_details_url)
            .query(&[
                ("place_id", place_id),
                ("key", self.api_key.as_str()),
                ("fields", DETAIL_FIELDS),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(PlacesError::rejected(format!(
                "details answered status {}",
                response.status().as_u16()
            )));
        }

        let decoded: DetailsDto = response.json().await.map_err(map_decode_error)?;
        Ok(decoded.result.map(|result| BusinessDetails {
            phone: result.formatted_phone_number,
            website: result.website,
            opening_hours: result.opening_hours,
            reviews: result.reviews,
        }))
    }

    async fn validate_key(&self) -> Result<KeyValidation, PlacesError> {
        let response = self
            .client
            .get(&self.places_textsearch_url)
            .query(&[("query", "test"), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;

        let http_ok = response.status().is_success();
        let decoded: TextSearchDto = response.json().await.map_err(map_decode_error)?;
        let api_ok = decoded.status == "OK" || decoded.status == "ZERO_RESULTS";

        Ok(KeyValidation {
            valid: http_ok && api_ok,
            quota: json!({
                "status": decoded.status,
                "error_message": decoded.error_message,
            }),
        })
    }
}

#[async_trait]
impl VideoInspiration for GoogleApiClient {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u8,
    ) -> Result<Vec<VideoSummary>, PlacesError> {
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&self.youtube_search_url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("key", self.api_key.as_str()),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("order", "relevance"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(PlacesError::rejected(format!(
                "video search answered status {}",
                response.status().as_u16()
            )));
        }

        let decoded: YouTubeSearchDto = response.json().await.map_err(map_decode_error)?;
        Ok(decoded
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                Some(VideoSummary {
                    id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    thumbnail: item
                        .snippet
                        .thumbnails
                        .and_then(|t| t.high)
                        .map(|t| t.url)
                        .unwrap_or_default(),
                    published_at: item.snippet.published_at,
                })
            })
            .collect())
    }

    async fn video_stats(&self, video_id: &str) -> Result<Option<VideoStats>, PlacesError> {
        let response = self
            .client
            .get(&self.youtube_videos_url)
            .query(&[
                ("part", "statistics,contentDetails"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(PlacesError::rejected(format!(
                "video stats answered status {}",
                response.status().as_u16()
            )));
        }

        let decoded: YouTubeVideosDto = response.json().await.map_err(map_decode_error)?;
        Ok(decoded.items.into_iter().next().map(|item| {
            let statistics = item.statistics.unwrap_or_default();
            let content = item.content_details.unwrap_or_default();
            VideoStats {
                view_count: statistics.view_count,
                like_count: statistics.like_count,
                comment_count: statistics.comment_count,
                duration: content.duration,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_search_dto_decodes_minimal_results() {
        let body = r#"{
            "status": "OK",
            "results": [{
                "place_id": "p1",
                "name": "Acme",
                "formatted_address": "1 Main St",
                "rating": 4.5,
                "user_ratings_total": 120,
                "geometry": { "location": { "lat": 51.5, "lng": -0.1 } }
            }]
        }"#;
        let decoded: TextSearchDto = serde_json::from_str(body).expect("decodes");
        assert_eq!(decoded.results.len(), 1);
        assert_eq!(decoded.results[0].place_id, "p1");
        assert_eq!(decoded.results[0].user_ratings_total, Some(120));
    }

    #[test]
    fn youtube_search_dto_skips_items_without_video_id() {
        let body = r#"{
            "items": [
                { "id": {}, "snippet": { "title": "channel", "publishedAt": "" } },
                { "id": { "videoId": "v1" },
                  "snippet": {
                      "title": "ad",
                      "description": "d",
                      "publishedAt": "2024-01-01T00:00:00Z",
                      "thumbnails": { "high": { "url": "https://img" } }
                  } }
            ]
        }"#;
        let decoded: YouTubeSearchDto = serde_json::from_str(body).expect("decodes");
        let usable: Vec<_> = decoded
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        assert_eq!(usable, vec!["v1".to_owned()]);
    }

    #[test]
    fn with_base_url_rewrites_every_endpoint() {
        let client = GoogleApiClient::new("key")
            .expect("client builds")
            .with_base_url("http://localhost:9999/");
        assert_eq!(
            client.places_details_url,
            "http://localhost:9999/maps/api/place/details/json"
        );
        assert_eq!(
            client.youtube_search_url,
            "http://localhost:9999/youtube/v3/search"
        );
    }
}
