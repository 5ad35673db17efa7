//! Gemini client for speech synthesis and document text extraction.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::http::{GeminiBackend, ReqwestBackend};
use crate::models::{
    Content, GenerateContentRequest, GenerationConfig, Part, PrebuiltVoiceConfig, SpeechConfig,
    VoiceConfig,
};

/// Instruction sent alongside the PDF when extracting text.
const EXTRACTION_PROMPT: &str = "Extract all readable text from this PDF document. \
Format the output as clear, natural paragraphs separated by double newlines. \
Do not include page numbers, headers, footers, or image captions unless they are integral to the narrative. \
Do not provide a summary; provide the full text content.";

/// Sample rate the speech model answers with.
const EXPECTED_AUDIO_RATE: u32 = 24_000;

/// Default Gemini client using the reqwest backend.
pub type DefaultGeminiClient = GeminiClient<ReqwestBackend>;

/// Client for the Gemini `generateContent` API.
///
/// Generic over the HTTP backend so it can be tested without a network.
pub struct GeminiClient<B: GeminiBackend = ReqwestBackend> {
    backend: B,
    tts_model: String,
    extraction_model: String,
}

impl DefaultGeminiClient {
    pub fn new(config: &GeminiConfig) -> GeminiResult<Self> {
        Ok(Self::with_backend(config, ReqwestBackend::new(config)?))
    }
}

impl<B: GeminiBackend> GeminiClient<B> {
    /// Create a client over a custom backend.
    pub fn with_backend(config: &GeminiConfig, backend: B) -> Self {
        Self {
            backend,
            tts_model: config.tts_model.clone(),
            extraction_model: config.extraction_model.clone(),
        }
    }

    /// Synthesize `text` with the prebuilt voice `voice_name`.
    ///
    /// Returns the decoded inline audio: raw 16-bit little-endian mono PCM.
    pub async fn synthesize(&self, text: &str, voice_name: &str) -> GeminiResult<Vec<u8>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(text)],
                role: None,
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice_name.to_string(),
                        },
                    },
                }),
            }),
        };

        let response = self
            .backend
            .generate_content(&self.tts_model, &request)
            .await?;

        let Some(audio) = response.first_inline_data() else {
            if let Some(reason) = response.block_reason() {
                tracing::warn!(%reason, "Speech request was blocked");
            }
            return Err(GeminiError::NoAudio);
        };

        if let Some(rate) = sample_rate(&audio.mime_type) {
            if rate != EXPECTED_AUDIO_RATE {
                tracing::warn!(rate, mime = %audio.mime_type, "Unexpected speech sample rate");
            }
        }

        let bytes = STANDARD.decode(audio.data.as_bytes())?;
        tracing::debug!(
            voice = %voice_name,
            chars = text.len(),
            bytes = bytes.len(),
            "Speech synthesized"
        );
        Ok(bytes)
    }

    /// Ask the extraction model for the full text of a PDF.
    ///
    /// The answer is plain text with paragraphs separated by blank lines.
    pub async fn extract_pdf_text(&self, pdf: &[u8]) -> GeminiResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline("application/pdf", STANDARD.encode(pdf)),
                    Part::text(EXTRACTION_PROMPT),
                ],
                role: None,
            }],
            generation_config: None,
        };

        let response = self
            .backend
            .generate_content(&self.extraction_model, &request)
            .await?;

        if let Some(reason) = response.block_reason() {
            return Err(GeminiError::InvalidResponse {
                message: format!("extraction blocked: {reason}"),
            });
        }

        let text = response.text();
        tracing::debug!(
            input_bytes = pdf.len(),
            chars = text.len(),
            "Text extracted by model"
        );
        Ok(text)
    }

    #[cfg(test)]
    pub(crate) const fn backend(&self) -> &B {
        &self.backend
    }
}

/// Parse `rate=N` out of an `audio/L16;codec=pcm;rate=24000` MIME type.
fn sample_rate(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}
