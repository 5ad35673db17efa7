//! Speech synthesis port.
//!
//! The speech source is a black box with latency and failure modes: text
//! in, encoded audio out. The playback sequencer never retries a failed
//! call; failures surface to the user as playback errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::VoiceSelector;

/// Errors returned by a [`SpeechSource`].
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The service could not be reached or the request failed in transit.
    #[error("Speech request failed: {0}")]
    Request(String),

    /// The service rejected the request (quota, auth, bad input).
    #[error("Speech service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service answered but returned no audio.
    #[error("Speech service returned no audio")]
    NoAudio,

    /// The source is not configured (missing credentials, etc.).
    #[error("Speech source not configured: {0}")]
    Configuration(String),
}

/// Converts segment text into encoded speech audio.
///
/// The returned bytes are raw little-endian 16-bit mono PCM at 24 kHz.
#[async_trait]
pub trait SpeechSource: Send + Sync {
    /// Synthesize `text` with `voice`.
    async fn synthesize(&self, text: &str, voice: &VoiceSelector) -> Result<Vec<u8>, SpeechError>;
}
