//! HTTP backend abstraction for the Gemini API.
//!
//! The client talks to the network only through [`GeminiBackend`], so the
//! request building and response handling can be tested against canned
//! responses.

use async_trait::async_trait;

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::models::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

// ============================================================================
// Backend Trait
// ============================================================================

/// Sends `generateContent` calls.
#[async_trait]
pub trait GeminiBackend: Send + Sync {
    /// POST `request` to `models/{model}:generateContent`.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production backend using reqwest.
///
/// No retries: a failed call surfaces straight to the caller.
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ReqwestBackend {
    pub fn new(config: &GeminiConfig) -> GeminiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }
}

#[async_trait]
impl GeminiBackend for ReqwestBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let url = self.endpoint(model);

        tracing::debug!(%model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiRequestFailed {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull the human-readable message out of an error body.
fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| reason.unwrap_or("unknown error").to_string())
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
