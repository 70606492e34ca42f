//! Intake form model and presence validation.
//!
//! The form mirrors the customer-facing brief: business identity, ad
//! objectives, visual preferences, and the popup's technical behaviour.
//! Validation checks presence only; URL and format checks are deliberately
//! out of scope.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// When the popup fires on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayTrigger {
    #[default]
    Immediate,
    TimeDelay,
    Scroll,
    ExitIntent,
}

impl DisplayTrigger {
    /// Wire value embedded into the generated popup script.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::TimeDelay => "time-delay",
            Self::Scroll => "scroll",
            Self::ExitIntent => "exit-intent",
        }
    }
}

/// How often the popup may reappear for the same visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFrequency {
    Once,
    #[default]
    Daily,
    Session,
}

impl DisplayFrequency {
    /// Wire value embedded into the generated popup script.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Session => "session",
        }
    }
}

/// Customer brief submitted through the intake endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub business_website: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub ad_goal: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub key_message: String,
    #[serde(default)]
    pub call_to_action: String,
    #[serde(default)]
    pub cta_link: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_colors: Vec<String>,
    #[serde(default)]
    pub include_images: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_logo: Option<String>,

    #[serde(default)]
    pub display_trigger: DisplayTrigger,
    #[serde(default)]
    pub display_frequency: DisplayFrequency,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_pages: Vec<String>,
}

/// Outcome of [`IntakeForm::validate`]: one entry per missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl IntakeForm {
    /// Check that the 8 required fields are present (non-blank after trim).
    pub fn validate(&self) -> ValidationReport {
        let required: [(&str, &str); 8] = [
            (&self.business_name, "Business name is required"),
            (&self.business_website, "Business website is required"),
            (&self.industry, "Industry is required"),
            (&self.ad_goal, "Ad goal is required"),
            (&self.target_audience, "Target audience is required"),
            (&self.key_message, "Key message is required"),
            (&self.call_to_action, "Call to action is required"),
            (&self.cta_link, "CTA link is required"),
        ];

        let errors: Vec<String> = required
            .into_iter()
            .filter(|(value, _)| value.trim().is_empty())
            .map(|(_, message)| message.to_owned())
            .collect();

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn complete_form() -> IntakeForm {
        IntakeForm {
            business_name: "Acme".into(),
            business_website: "https://acme.com".into(),
            industry: "tech".into(),
            ad_goal: "leads".into(),
            target_audience: "devs".into(),
            key_message: "fast".into(),
            call_to_action: "Buy".into(),
            cta_link: "https://acme.com/buy".into(),
            preferred_colors: Vec::new(),
            include_images: false,
            brand_logo: None,
            display_trigger: DisplayTrigger::default(),
            display_frequency: DisplayFrequency::default(),
            target_pages: Vec::new(),
        }
    }

    #[test]
    fn complete_form_passes() {
        let report = complete_form().validate();
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[rstest]
    #[case::business_name(|f: &mut IntakeForm| f.business_name.clear(), "Business name is required")]
    #[case::website(|f: &mut IntakeForm| f.business_website.clear(), "Business website is required")]
    #[case::industry(|f: &mut IntakeForm| f.industry.clear(), "Industry is required")]
    #[case::goal(|f: &mut IntakeForm| f.ad_goal.clear(), "Ad goal is required")]
    #[case::audience(|f: &mut IntakeForm| f.target_audience.clear(), "Target audience is required")]
    #[case::message(|f: &mut IntakeForm| f.key_message.clear(), "Key message is required")]
    #[case::cta(|f: &mut IntakeForm| f.call_to_action.clear(), "Call to action is required")]
    #[case::cta_link(|f: &mut IntakeForm| f.cta_link.clear(), "CTA link is required")]
    fn each_missing_field_is_reported(
        #[case] blank: fn(&mut IntakeForm),
        #[case] expected: &str,
    ) {
        let mut form = complete_form();
        blank(&mut form);
        let report = form.validate();
        assert!(!report.valid);
        assert_eq!(report.errors, vec![expected.to_owned()]);
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut form = complete_form();
        form.key_message = "   ".into();
        assert!(!form.validate().valid);
    }

    #[test]
    fn empty_form_reports_all_eight_fields() {
        let form: IntakeForm = serde_json::from_str("{}").expect("defaults deserialize");
        let report = form.validate();
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 8);
    }

    #[test]
    fn trigger_and_frequency_parse_wire_values() {
        let form: IntakeForm = serde_json::from_value(serde_json::json!({
            "displayTrigger": "exit-intent",
            "displayFrequency": "once",
        }))
        .expect("wire values deserialize");
        assert_eq!(form.display_trigger, DisplayTrigger::ExitIntent);
        assert_eq!(form.display_frequency, DisplayFrequency::Once);
    }
}
