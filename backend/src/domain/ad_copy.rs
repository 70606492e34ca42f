//! Ad copy: prompt construction, model-output parsing, and the deterministic
//! fallback used when the generative-text call fails.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::intake::IntakeForm;

/// Copy block rendered into the popup templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdCopy {
    pub headline: String,
    pub subheadline: String,
    pub bullets: Vec<String>,
    pub cta_text: String,
    pub trust_element: String,
}

/// Errors raised when a model response cannot be used as copy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CopyParseError {
    /// The response was not valid JSON in the requested shape.
    #[error("model response is not valid copy JSON: {message}")]
    Malformed { message: String },
}

impl AdCopy {
    /// Fixed copy returned whenever the generative-text call fails.
    ///
    /// Deterministic by contract: tests assert the exact content.
    pub fn fallback() -> Self {
        Self {
            headline: "Transform Your Business Today".into(),
            subheadline: "Join thousands of successful companies using our proven strategies"
                .into(),
            bullets: vec![
                "Increase conversions by up to 300%".into(),
                "Professional design that builds trust".into(),
                "Easy to implement in minutes".into(),
            ],
            cta_text: "Get Started Now".into(),
            trust_element: "Join 10,000+ satisfied customers".into(),
        }
    }

    /// Parse a raw model response into copy.
    ///
    /// Models occasionally wrap the JSON object in a markdown fence; the
    /// parser tolerates that and anything before/after the outermost braces.
    pub fn parse(raw: &str) -> Result<Self, CopyParseError> {
        let trimmed = raw.trim();
        let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => &trimmed[start..=end],
            _ => trimmed,
        };
        serde_json::from_str(candidate).map_err(|err| CopyParseError::Malformed {
            message: err.to_string(),
        })
    }
}

/// Build the copywriting prompt for an intake brief.
///
/// Embeds the business attributes and the required JSON output shape so the
/// response can be parsed by [`AdCopy::parse`].
pub fn copy_prompt(form: &IntakeForm) -> String {
    format!(
        r#"You are an expert copywriter for popup ads. Create compelling ad copy based on this brief:

Business: {business}
Industry: {industry}
Goal: {goal}
Target Audience: {audience}
Key Message: {message}
Call-to-Action: {cta}

Requirements:
1. Attention-grabbing headline (max 10 words)
2. Compelling subheadline (max 20 words)
3. 2-3 bullet points highlighting benefits
4. Strong CTA button text (max 4 words)
5. Trust element (testimonial snippet, stat, or guarantee)

Tone: Professional, confident, results-oriented

Output format:
{{
  "headline": "...",
  "subheadline": "...",
  "bullets": ["...", "...", "..."],
  "ctaText": "...",
  "trustElement": "..."
}}"#,
        business = form.business_name,
        industry = form.industry,
        goal = form.ad_goal,
        audience = form.target_audience,
        message = form.key_message,
        cta = form.call_to_action,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_deterministic() {
        assert_eq!(AdCopy::fallback(), AdCopy::fallback());
        assert_eq!(AdCopy::fallback().bullets.len(), 3);
    }

    #[test]
    fn parses_plain_json() {
        let raw = r#"{"headline":"H","subheadline":"S","bullets":["a","b"],"ctaText":"Go","trustElement":"T"}"#;
        let copy = AdCopy::parse(raw).expect("plain JSON parses");
        assert_eq!(copy.headline, "H");
        assert_eq!(copy.bullets, vec!["a", "b"]);
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"headline\":\"H\",\"subheadline\":\"S\",\"bullets\":[],\"ctaText\":\"Go\",\"trustElement\":\"T\"}\n```";
        let copy = AdCopy::parse(raw).expect("fenced JSON parses");
        assert_eq!(copy.cta_text, "Go");
    }

    #[test]
    fn rejects_non_json_response() {
        let err = AdCopy::parse("Sure! Here is some copy for you.").expect_err("prose rejected");
        assert!(matches!(err, CopyParseError::Malformed { .. }));
    }

    #[test]
    fn prompt_embeds_brief_fields() {
        let form = IntakeForm {
            business_name: "Acme".into(),
            industry: "tech".into(),
            ad_goal: "leads".into(),
            target_audience: "devs".into(),
            key_message: "fast".into(),
            call_to_action: "Buy".into(),
            ..IntakeForm::default()
        };
        let prompt = copy_prompt(&form);
        assert!(prompt.contains("Business: Acme"));
        assert!(prompt.contains("\"trustElement\""));
    }
}
