//! Raw PCM decoding.
//!
//! The speech source returns headerless little-endian signed 16-bit PCM.
//! Decoding converts it to the `f32` samples rodio plays.

use std::time::Duration;

use crate::error::PlaybackError;

/// Sample rate of synthesized speech.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Channel count of synthesized speech.
pub const SPEECH_CHANNELS: u16 = 1;

/// Decoded audio ready for the output device.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayableBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl PlayableBuffer {
    /// Create a buffer from interleaved samples.
    #[must_use]
    pub const fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Interleaved samples in `[-1.0, 1.0)`.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playing time of the buffer.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.len() as f64 / f64::from(self.sample_rate))
    }
}

/// Decode little-endian signed 16-bit PCM into a [`PlayableBuffer`].
///
/// Each sample is scaled by `1 / 32768`. An empty payload decodes to an
/// empty buffer; a payload with a dangling odd byte is rejected.
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<PlayableBuffer, PlaybackError> {
    if bytes.len() % 2 != 0 {
        return Err(PlaybackError::DecodeError(format!(
            "16-bit PCM payload has odd length {}",
            bytes.len()
        )));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect();

    Ok(PlayableBuffer::new(samples, sample_rate, channels))
}
