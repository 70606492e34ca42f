//! Ad creation pipeline: brief → copy → rendered popup.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::ad::{Ad, AdMetadata};
use super::ad_copy::{AdCopy, copy_prompt};
use super::brand::AISIM;
use super::error::Error;
use super::intake::IntakeForm;
use super::ports::{AdRepository, TextGenerator};
use super::templates;

/// Placeholder preview until real screenshotting lands.
const PREVIEW_PLACEHOLDER: &str = "data:image/png;base64,";

/// Flat CTR estimate recorded on generated ads.
const ESTIMATED_CTR: f64 = 2.5;

/// Orchestrates copy generation and template rendering.
pub struct AdCreationService {
    text: Arc<dyn TextGenerator>,
    ads: Arc<dyn AdRepository>,
    public_base_url: String,
}

impl AdCreationService {
    /// Create the service over its ports.
    pub fn new(
        text: Arc<dyn TextGenerator>,
        ads: Arc<dyn AdRepository>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            text,
            ads,
            public_base_url: public_base_url.into(),
        }
    }

    /// Generate copy for a brief.
    ///
    /// Any transport-level failure degrades to the deterministic fallback
    /// copy. A response that arrives but cannot be parsed is a typed error:
    /// the model answered, the answer is unusable, and silently shipping it
    /// downstream would render garbage into customer ads.
    pub async fn generate_copy(&self, form: &IntakeForm) -> Result<AdCopy, Error> {
        let prompt = copy_prompt(form);
        match self.text.generate(&prompt).await {
            Ok(raw) => AdCopy::parse(&raw)
                .map_err(|err| Error::internal(format!("unusable model copy: {err}"))),
            Err(err) => {
                warn!(error = %err, "text generation failed, using fallback copy");
                Ok(AdCopy::fallback())
            }
        }
    }

    /// Generate a preview ad for an intake submission. Not persisted.
    pub async fn generate_preview(&self, form: &IntakeForm) -> Result<Ad, Error> {
        self.generate(form, "preview", None).await
    }

    /// Generate the final ad for a paid order and persist it against the
    /// payment intent.
    pub async fn generate_final(
        &self,
        form: &IntakeForm,
        package: &str,
        payment_intent_id: &str,
    ) -> Result<Ad, Error> {
        let ad = self
            .generate(form, package, Some(payment_intent_id.to_owned()))
            .await?;
        self.ads
            .insert(&ad)
            .await
            .map_err(|err| Error::internal(format!("failed to persist ad: {err}")))?;
        Ok(ad)
    }

    async fn generate(
        &self,
        form: &IntakeForm,
        package: &str,
        payment_intent_id: Option<String>,
    ) -> Result<Ad, Error> {
        let copy = self.generate_copy(form).await?;
        let id = Ad::generate_id();
        let track_endpoint = format!(
            "{}/api/ads/{}/track/impression",
            self.public_base_url.trim_end_matches('/'),
            id
        );
        Ok(Ad {
            html: templates::render_html(form, &copy),
            css: templates::render_css(&AISIM),
            javascript: templates::render_js(form, &id, &track_endpoint),
            id,
            payment_intent_id,
            preview: PREVIEW_PLACEHOLDER.to_owned(),
            metadata: AdMetadata {
                package: package.to_owned(),
                brand_compliant: true,
                estimated_ctr: ESTIMATED_CTR,
            },
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureAdRepository, MockTextGenerator, TextGenerationError};

    fn form() -> IntakeForm {
        serde_json::from_value(serde_json::json!({
            "businessName": "Acme",
            "businessWebsite": "https://acme.com",
            "industry": "tech",
            "adGoal": "leads",
            "targetAudience": "devs",
            "keyMessage": "fast",
            "callToAction": "Buy",
            "ctaLink": "https://acme.com/buy",
        }))
        .expect("form deserializes")
    }

    fn service(text: MockTextGenerator) -> AdCreationService {
        AdCreationService::new(
            Arc::new(text),
            Arc::new(FixtureAdRepository::default()),
            "https://ads.example.com",
        )
    }

    #[tokio::test]
    async fn transport_failure_always_yields_the_fallback() {
        let mut text = MockTextGenerator::new();
        text.expect_generate()
            .times(3)
            .returning(|_| Err(TextGenerationError::timeout("deadline exceeded")));
        let service = service(text);

        for _ in 0..3 {
            let copy = service.generate_copy(&form()).await.expect("fallback copy");
            assert_eq!(copy, AdCopy::fallback());
        }
    }

    #[tokio::test]
    async fn model_copy_is_parsed_when_valid() {
        let mut text = MockTextGenerator::new();
        text.expect_generate().returning(|_| {
            Ok(r#"{"headline":"Ship faster","subheadline":"s","bullets":["a"],"ctaText":"Go","trustElement":"t"}"#
                .to_owned())
        });
        let service = service(text);

        let copy = service.generate_copy(&form()).await.expect("parsed copy");
        assert_eq!(copy.headline, "Ship faster");
    }

    #[tokio::test]
    async fn unparseable_model_response_is_a_typed_error() {
        let mut text = MockTextGenerator::new();
        text.expect_generate()
            .returning(|_| Ok("I'd be happy to help with copy!".to_owned()));
        let service = service(text);

        let err = service
            .generate_copy(&form())
            .await
            .expect_err("prose is rejected");
        assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn preview_renders_all_three_blobs() {
        let mut text = MockTextGenerator::new();
        text.expect_generate()
            .returning(|_| Err(TextGenerationError::transport("offline")));
        let service = service(text);

        let ad = service.generate_preview(&form()).await.expect("preview ad");
        assert!(!ad.html.is_empty());
        assert!(!ad.css.is_empty());
        assert!(!ad.javascript.is_empty());
        assert!(ad.javascript.contains(&ad.id));
        assert_eq!(ad.metadata.package, "preview");
        assert!(ad.payment_intent_id.is_none());
    }

    #[tokio::test]
    async fn final_ad_is_persisted_against_the_intent() {
        let mut text = MockTextGenerator::new();
        text.expect_generate()
            .returning(|_| Err(TextGenerationError::transport("offline")));
        let ads = Arc::new(FixtureAdRepository::default());
        let service = AdCreationService::new(Arc::new(text), ads.clone(), "http://localhost:8080");

        let ad = service
            .generate_final(&form(), "pkg_pro", "pi_123")
            .await
            .expect("final ad");
        assert_eq!(ad.payment_intent_id.as_deref(), Some("pi_123"));

        use crate::domain::ports::AdRepository as _;
        let stored = ads.find_by_id(&ad.id).await.expect("lookup").expect("stored");
        assert_eq!(stored.metadata.package, "pkg_pro");
    }
}
