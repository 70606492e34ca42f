//! Reqwest-backed text-generation adapter for the Gemini REST API.
//!
//! Owns transport details only: request serialisation, timeout and status
//! mapping, and extraction of the first candidate's text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::domain::ports::{TextGenerationError, TextGenerator};

const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct GenerateContentDto {
    #[serde(default)]
    candidates: Vec<CandidateDto>,
}

#[derive(Deserialize)]
struct CandidateDto {
    content: CandidateContentDto,
}

#[derive(Deserialize)]
struct CandidateContentDto {
    #[serde(default)]
    parts: Vec<PartDto>,
}

#[derive(Deserialize)]
struct PartDto {
    #[serde(default)]
    text: String,
}

/// Gemini adapter for the [`TextGenerator`] port.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    /// Build the adapter with the default endpoint and timeout.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    /// Build the adapter against an explicit endpoint (tests point this at a
    /// local server).
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> TextGenerationError {
    if error.is_timeout() {
        TextGenerationError::timeout(error.to_string())
    } else {
        TextGenerationError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &str) -> TextGenerationError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    if status.is_client_error() {
        TextGenerationError::rejected(message)
    } else {
        TextGenerationError::transport(message)
    }
}

fn body_preview(body: &str) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    body.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect()
}

fn extract_text(body: &[u8]) -> Result<String, TextGenerationError> {
    let decoded: GenerateContentDto = serde_json::from_slice(body)
        .map_err(|err| TextGenerationError::decode(format!("invalid response JSON: {err}")))?;
    decoded
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| TextGenerationError::decode("response carries no candidate text"))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &String::from_utf8_lossy(&body)));
        }

        extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let body = br#"{
            "candidates": [
                { "content": { "parts": [ { "text": "{\"headline\":\"H\"}" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        }"#;
        let text = extract_text(body).expect("text extracted");
        assert_eq!(text, "{\"headline\":\"H\"}");
    }

    #[test]
    fn empty_candidate_list_is_a_decode_error() {
        let err = extract_text(br#"{"candidates": []}"#).expect_err("no candidates");
        assert!(matches!(err, TextGenerationError::Decode { .. }));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = extract_text(b"<html>oops</html>").expect_err("not JSON");
        assert!(matches!(err, TextGenerationError::Decode { .. }));
    }

    #[test]
    fn client_statuses_map_to_rejected() {
        let err = map_status_error(StatusCode::FORBIDDEN, "{\"error\":\"key invalid\"}");
        assert!(matches!(err, TextGenerationError::Rejected { .. }));
    }

    #[test]
    fn server_statuses_map_to_transport() {
        let err = map_status_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, TextGenerationError::Transport { .. }));
    }
}
