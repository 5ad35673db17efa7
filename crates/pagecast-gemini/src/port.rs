//! Core port implementations for the Gemini client.
//!
//! Converts internal `GeminiError`s into the core `SpeechError` and
//! `ExtractError` at the boundary.

use std::sync::Arc;

use async_trait::async_trait;
use pagecast_core::{ExtractError, PageText, SpeechError, SpeechSource, TextSource, VoiceSelector};

use crate::client::GeminiClient;
use crate::error::GeminiError;
use crate::http::{GeminiBackend, ReqwestBackend};

const TEXT_SOURCE_NAME: &str = "gemini";

// ============================================================================
// Error Mapping
// ============================================================================

fn to_speech_error(err: GeminiError) -> SpeechError {
    match err {
        GeminiError::MissingApiKey => SpeechError::Configuration(err.to_string()),
        GeminiError::ApiRequestFailed { status, message } => {
            SpeechError::Rejected { status, message }
        }
        GeminiError::NoAudio => SpeechError::NoAudio,
        GeminiError::Network(_)
        | GeminiError::InvalidResponse { .. }
        | GeminiError::JsonParse(_)
        | GeminiError::Base64(_) => SpeechError::Request(err.to_string()),
    }
}

fn to_extract_error(err: GeminiError) -> ExtractError {
    match err {
        GeminiError::MissingApiKey => ExtractError::Unavailable {
            source_name: TEXT_SOURCE_NAME.to_string(),
            reason: err.to_string(),
        },
        other => ExtractError::Failed {
            source_name: TEXT_SOURCE_NAME.to_string(),
            reason: other.to_string(),
        },
    }
}

// ============================================================================
// Speech
// ============================================================================

/// [`SpeechSource`] backed by the Gemini TTS model.
pub struct GeminiSpeechSource<B: GeminiBackend = ReqwestBackend> {
    client: Arc<GeminiClient<B>>,
}

impl<B: GeminiBackend> GeminiSpeechSource<B> {
    pub const fn new(client: Arc<GeminiClient<B>>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<B: GeminiBackend + 'static> SpeechSource for GeminiSpeechSource<B> {
    async fn synthesize(&self, text: &str, voice: &VoiceSelector) -> Result<Vec<u8>, SpeechError> {
        self.client
            .synthesize(text, &voice.id)
            .await
            .map_err(to_speech_error)
    }
}

// ============================================================================
// Text extraction
// ============================================================================

/// [`TextSource`] that hands the whole PDF to the Gemini extraction model.
///
/// Works on scanned documents, but loses page boundaries: everything comes
/// back as page 1.
pub struct GeminiTextSource<B: GeminiBackend = ReqwestBackend> {
    client: Arc<GeminiClient<B>>,
}

impl<B: GeminiBackend> GeminiTextSource<B> {
    pub const fn new(client: Arc<GeminiClient<B>>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<B: GeminiBackend + 'static> TextSource for GeminiTextSource<B> {
    fn name(&self) -> &str {
        TEXT_SOURCE_NAME
    }

    async fn extract(&self, document: &[u8]) -> Result<Vec<PageText>, ExtractError> {
        let text = self
            .client
            .extract_pdf_text(document)
            .await
            .map_err(to_extract_error)?;

        Ok(vec![PageText::new(1, text)])
    }
}
