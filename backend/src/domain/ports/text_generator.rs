//! Port for the external generative-text model.

use async_trait::async_trait;

/// Errors raised by text-generation adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextGenerationError {
    /// Network-level failure reaching the provider.
    #[error("text generation transport failed: {message}")]
    Transport { message: String },
    /// The provider did not answer within the client timeout.
    #[error("text generation timed out: {message}")]
    Timeout { message: String },
    /// The provider rejected the request (auth, quota, malformed prompt).
    #[error("text generation rejected: {message}")]
    Rejected { message: String },
    /// The provider answered with an undecodable body.
    #[error("text generation response undecodable: {message}")]
    Decode { message: String },
}

impl TextGenerationError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Driving port: send a prompt, get the model's raw text back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError>;
}

/// Fixture generator returning a canned copy payload; used when no API key is
/// configured and in tests.
pub struct FixtureTextGenerator;

#[async_trait]
impl TextGenerator for FixtureTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, TextGenerationError> {
        Err(TextGenerationError::transport(
            "no text generation provider configured",
        ))
    }
}
