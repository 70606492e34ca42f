//! Lead sourcing: places discovery, web-search scraping, and AI fit scoring.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::error::Error;
use super::lead::{
    CompanySize, ContactDetails, Lead, LeadSource, LeadStatus, estimate_size_from_places,
};
use super::ports::{
    KeyValidation, LeadRepository, PlacesDirectory, TextGenerator, VideoInspiration, WebSearch,
};

/// Pause between per-business detail lookups. Fixed, not adaptive: the
/// directory's quota is generous as long as calls stay serialized.
const DETAIL_CALL_PAUSE: Duration = Duration::from_millis(100);

/// Score at or above which a lead counts as qualified.
const QUALIFICATION_THRESHOLD: f64 = 0.7;

/// Score assumed when the model's answer cannot be parsed.
const DEFAULT_FIT_SCORE: f64 = 0.5;

/// Criteria for places-based discovery.
#[derive(Debug, Clone)]
pub struct PlacesCriteria {
    pub industries: Vec<String>,
    pub locations: Vec<String>,
    pub radius_m: u32,
    pub limit: usize,
}

/// Criteria for web-search discovery.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub industries: Vec<String>,
    pub keywords: Vec<String>,
    pub limit: usize,
}

/// Lead discovery and qualification over the external data ports.
pub struct LeadSourcingService {
    places: Arc<dyn PlacesDirectory>,
    video: Arc<dyn VideoInspiration>,
    search: Arc<dyn WebSearch>,
    text: Arc<dyn TextGenerator>,
    leads: Arc<dyn LeadRepository>,
    detail_pause: Duration,
}

impl LeadSourcingService {
    /// Create the service over its ports.
    pub fn new(
        places: Arc<dyn PlacesDirectory>,
        video: Arc<dyn VideoInspiration>,
        search: Arc<dyn WebSearch>,
        text: Arc<dyn TextGenerator>,
        leads: Arc<dyn LeadRepository>,
    ) -> Self {
        Self {
            places,
            video,
            search,
            text,
            leads,
            detail_pause: DETAIL_CALL_PAUSE,
        }
    }

    /// Override the inter-call pause (tests).
    pub fn with_detail_pause(mut self, pause: Duration) -> Self {
        self.detail_pause = pause;
        self
    }

    /// Discover leads through the places directory.
    ///
    /// Processing is deliberately sequential: one detail lookup at a time
    /// with a fixed pause between calls. A failed search for one
    /// industry/location pair is logged and skipped, not fatal.
    pub async fn discover_from_places(&self, criteria: &PlacesCriteria) -> Vec<Lead> {
        let mut discovered = Vec::new();

        for industry in &criteria.industries {
            for location in &criteria.locations {
                let query = format!("{industry} companies");
                let businesses = match self
                    .places
                    .search_businesses(&query, location, criteria.radius_m)
                    .await
                {
                    Ok(businesses) => businesses,
                    Err(err) => {
                        warn!(industry, location, error = %err, "places search failed");
                        continue;
                    }
                };

                for business in businesses.into_iter().take(criteria.limit) {
                    let details = match self.places.business_details(&business.place_id).await {
                        Ok(details) => details.unwrap_or_default(),
                        Err(err) => {
                            warn!(place_id = %business.place_id, error = %err, "detail lookup failed");
                            Default::default()
                        }
                    };

                    let size = estimate_size_from_places(
                        business.rating,
                        business.review_count,
                        details.website.is_some(),
                        details.phone.is_some(),
                    );
                    let lead = Lead {
                        // Stable id: re-discovering the same place updates
                        // the existing row instead of duplicating it.
                        id: format!("google_{}", business.place_id),
                        company_name: business.name.clone(),
                        website: details.website.clone().unwrap_or_default(),
                        industry: industry.clone(),
                        contact_email: None,
                        contact_name: None,
                        estimated_size: size,
                        source: LeadSource::GooglePlaces,
                        status: LeadStatus::New,
                        metadata: json!({
                            "address": business.address,
                            "phone": details.phone,
                            "rating": business.rating,
                            "reviewCount": business.review_count,
                            "location": {
                                "lat": business.latitude,
                                "lng": business.longitude,
                            },
                            "placeId": business.place_id,
                            "openingHours": details.opening_hours,
                            "reviews": details.reviews,
                        }),
                        created_at: Utc::now(),
                    };
                    discovered.push(lead);

                    tokio::time::sleep(self.detail_pause).await;
                }
            }
        }

        self.persist(&discovered).await;
        discovered
    }

    /// Discover leads by scraping web-search result pages.
    pub async fn discover_from_search(&self, criteria: &SearchCriteria) -> Vec<Lead> {
        let mut discovered = Vec::new();

        for industry in &criteria.industries {
            let query = format!(
                "{industry} companies {} contact",
                criteria.keywords.join(" ")
            );
            let hits = match self.search.search(&query, criteria.limit).await {
                Ok(hits) => hits,
                Err(err) => {
                    warn!(industry, error = %err, "web search failed");
                    continue;
                }
            };

            for hit in hits {
                let details = match self.search.fetch_page(&hit.url).await {
                    Ok(html) => ContactDetails::extract(&html),
                    Err(err) => {
                        warn!(url = %hit.url, error = %err, "page fetch failed");
                        ContactDetails::default()
                    }
                };

                let lead = Lead {
                    id: Lead::generate_id(),
                    company_name: details
                        .company_name
                        .clone()
                        .unwrap_or_else(|| hit.title.clone()),
                    website: hit.url.clone(),
                    industry: industry.clone(),
                    contact_email: details.email.clone(),
                    contact_name: None,
                    estimated_size: details.estimated_size(),
                    source: LeadSource::WebSearch,
                    status: LeadStatus::New,
                    metadata: json!({
                        "description": hit.description,
                        "searchRank": hit.rank,
                        "phone": details.phone,
                    }),
                    created_at: Utc::now(),
                };
                discovered.push(lead);
            }
        }

        self.persist(&discovered).await;
        discovered
    }

    /// Filter leads to those scoring at or above the qualification
    /// threshold, advancing their status.
    pub async fn qualify(&self, leads: Vec<Lead>) -> Vec<Lead> {
        let mut qualified = Vec::new();
        for mut lead in leads {
            let score = self.fit_score(&lead).await;
            if score >= QUALIFICATION_THRESHOLD {
                lead.status = LeadStatus::Qualified;
                if let Some(map) = lead.metadata.as_object_mut() {
                    map.insert("fitScore".to_owned(), json!(score));
                }
                if let Err(err) = self.leads.update_status(&lead.id, LeadStatus::Qualified).await {
                    warn!(lead_id = %lead.id, error = %err, "failed to persist qualification");
                }
                qualified.push(lead);
            }
        }
        qualified
    }

    /// Ask the model for a 0–1 fit score. Unparseable or failed answers
    /// default to the neutral score.
    async fn fit_score(&self, lead: &Lead) -> f64 {
        let prompt = format!(
            r#"Evaluate this lead for an AI automated ad company:

Company: {company}
Industry: {industry}
Website: {website}
Size: {size}

Score from 0-1 based on:
1. Likelihood they need digital advertising
2. Budget availability
3. Technical sophistication
4. Current digital presence

Return only a number between 0 and 1."#,
            company = lead.company_name,
            industry = lead.industry,
            website = lead.website,
            size = lead.estimated_size.as_str(),
        );

        match self.text.generate(&prompt).await {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .map(|score| score.clamp(0.0, 1.0))
                .unwrap_or(DEFAULT_FIT_SCORE),
            Err(err) => {
                warn!(lead_id = %lead.id, error = %err, "fit scoring failed");
                DEFAULT_FIT_SCORE
            }
        }
    }

    /// Video inspiration for an industry: search, then enrich each hit with
    /// its statistics.
    pub async fn ad_inspiration(
        &self,
        industry: &str,
        keywords: &[String],
    ) -> Result<Vec<Value>, Error> {
        let query = format!("{industry} {} marketing advertising", keywords.join(" "));
        let videos = self
            .video
            .search_videos(&query, 5)
            .await
            .map_err(|err| Error::service_unavailable(format!("video search failed: {err}")))?;

        let mut enriched = Vec::with_capacity(videos.len());
        for video in videos {
            let stats = match self.video.video_stats(&video.id).await {
                Ok(stats) => stats.unwrap_or_default(),
                Err(err) => {
                    warn!(video_id = %video.id, error = %err, "video stats lookup failed");
                    Default::default()
                }
            };
            enriched.push(json!({
                "id": video.id,
                "title": video.title,
                "description": video.description,
                "thumbnail": video.thumbnail,
                "publishedAt": video.published_at,
                "viewCount": stats.view_count,
                "duration": stats.duration,
                "likeCount": stats.like_count,
                "commentCount": stats.comment_count,
            }));
        }
        Ok(enriched)
    }

    /// Probe the places API key.
    pub async fn validate_places_key(&self) -> Result<KeyValidation, Error> {
        self.places
            .validate_key()
            .await
            .map_err(|err| Error::service_unavailable(format!("key validation failed: {err}")))
    }

    async fn persist(&self, leads: &[Lead]) {
        for lead in leads {
            if let Err(err) = self.leads.upsert(lead).await {
                warn!(lead_id = %lead.id, error = %err, "failed to save lead; continuing");
            }
        }
        if !leads.is_empty() {
            info!(count = leads.len(), "saved discovered leads");
        }
    }
}
