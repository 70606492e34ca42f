//! Lead aggregate, company-size heuristics, and contact extraction from
//! scraped pages.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Estimated company size bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompanySize {
    Startup,
    Small,
    Medium,
    Large,
}

impl CompanySize {
    /// Wire/database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Parse a stored value, defaulting unknown input to `Startup`.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "small" => Self::Small,
            "medium" => Self::Medium,
            "large" => Self::Large,
            _ => Self::Startup,
        }
    }
}

/// Where a lead was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LeadSource {
    WebSearch,
    GooglePlaces,
    Directory,
    Manual,
}

impl LeadSource {
    /// Wire/database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebSearch => "web-search",
            Self::GooglePlaces => "google-places",
            Self::Directory => "directory",
            Self::Manual => "manual",
        }
    }

    /// Parse a stored value, defaulting unknown input to `Manual`.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "web-search" => Self::WebSearch,
            "google-places" => Self::GooglePlaces,
            "directory" => Self::Directory,
            _ => Self::Manual,
        }
    }
}

/// Lifecycle status. Forward-only by convention (not enforced).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
}

impl LeadStatus {
    /// Wire/database value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Converted => "converted",
        }
    }

    /// Parse a stored value, defaulting unknown input to `New`.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "contacted" => Self::Contacted,
            "qualified" => Self::Qualified,
            "converted" => Self::Converted,
            _ => Self::New,
        }
    }
}

/// A discovered sales lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub company_name: String,
    pub website: String,
    pub industry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    pub estimated_size: CompanySize,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Generate a fresh lead identifier.
    pub fn generate_id() -> String {
        format!("lead_{}", Uuid::new_v4().simple())
    }
}

/// Contact details best-effort extracted from a scraped page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static TITLE_RE: OnceLock<Regex> = OnceLock::new();
static H1_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"(\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone regex")
    })
}

fn title_regex() -> &'static Regex {
    TITLE_RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").expect("valid regex"))
}

fn h1_regex() -> &'static Regex {
    H1_RE.get_or_init(|| Regex::new(r"(?is)<h1[^>]*>([^<]+)</h1>").expect("valid regex"))
}

impl ContactDetails {
    /// Best-effort regex scrape of a page for email, phone, and company name
    /// (page title, falling back to the first `h1`). Frequently yields empty
    /// fields; callers must tolerate that.
    pub fn extract(html: &str) -> Self {
        let company_name = title_regex()
            .captures(html)
            .or_else(|| h1_regex().captures(html))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_owned())
            .filter(|name| !name.is_empty());

        Self {
            company_name,
            email: email_regex().find(html).map(|m| m.as_str().to_owned()),
            phone: phone_regex().find(html).map(|m| m.as_str().to_owned()),
        }
    }

    /// Size heuristic for scraped leads: both contact channels present means
    /// medium, one means small, none means startup.
    pub fn estimated_size(&self) -> CompanySize {
        match (self.email.is_some(), self.phone.is_some()) {
            (true, true) => CompanySize::Medium,
            (true, false) | (false, true) => CompanySize::Small,
            (false, false) => CompanySize::Startup,
        }
    }
}

/// Size heuristic for places-sourced leads, driven by rating, review volume,
/// and contact presence.
pub fn estimate_size_from_places(
    rating: Option<f64>,
    review_count: Option<i64>,
    has_website: bool,
    has_phone: bool,
) -> CompanySize {
    let rating = rating.unwrap_or(0.0);
    let reviews = review_count.unwrap_or(0);

    if reviews > 100 && rating > 4.0 && has_website && has_phone {
        CompanySize::Large
    } else if reviews > 20 && rating > 3.5 && (has_website || has_phone) {
        CompanySize::Medium
    } else if reviews > 0 || has_website || has_phone {
        CompanySize::Small
    } else {
        CompanySize::Startup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn extracts_contact_details_from_page() {
        let html = r#"<html><head><title>Acme Widgets</title></head>
            <body><h1>Welcome</h1>
            <p>Reach us at sales@acme.com or (415) 555-0134.</p></body></html>"#;
        let details = ContactDetails::extract(html);
        assert_eq!(details.company_name.as_deref(), Some("Acme Widgets"));
        assert_eq!(details.email.as_deref(), Some("sales@acme.com"));
        assert_eq!(details.phone.as_deref(), Some("(415) 555-0134"));
    }

    #[test]
    fn falls_back_to_h1_without_title() {
        let html = "<body><h1>Acme Widgets</h1></body>";
        let details = ContactDetails::extract(html);
        assert_eq!(details.company_name.as_deref(), Some("Acme Widgets"));
    }

    #[test]
    fn tolerates_pages_without_contacts() {
        let details = ContactDetails::extract("<html><body>nothing here</body></html>");
        assert_eq!(details, ContactDetails::default());
        assert_eq!(details.estimated_size(), CompanySize::Startup);
    }

    #[rstest]
    #[case(Some("a@b.co"), Some("555-123-4567"), CompanySize::Medium)]
    #[case(Some("a@b.co"), None, CompanySize::Small)]
    #[case(None, Some("555-123-4567"), CompanySize::Small)]
    #[case(None, None, CompanySize::Startup)]
    fn scrape_size_heuristic(
        #[case] email: Option<&str>,
        #[case] phone: Option<&str>,
        #[case] expected: CompanySize,
    ) {
        let details = ContactDetails {
            company_name: None,
            email: email.map(str::to_owned),
            phone: phone.map(str::to_owned),
        };
        assert_eq!(details.estimated_size(), expected);
    }

    #[rstest]
    #[case(Some(4.5), Some(150), true, true, CompanySize::Large)]
    #[case(Some(4.0), Some(50), true, false, CompanySize::Medium)]
    #[case(Some(3.0), Some(5), false, false, CompanySize::Small)]
    #[case(None, None, true, false, CompanySize::Small)]
    #[case(None, None, false, false, CompanySize::Startup)]
    fn places_size_heuristic(
        #[case] rating: Option<f64>,
        #[case] reviews: Option<i64>,
        #[case] website: bool,
        #[case] phone: bool,
        #[case] expected: CompanySize,
    ) {
        assert_eq!(
            estimate_size_from_places(rating, reviews, website, phone),
            expected
        );
    }

    #[test]
    fn status_round_trips_wire_values() {
        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::Converted,
        ] {
            assert_eq!(LeadStatus::parse_or_default(status.as_str()), status);
        }
    }
}
