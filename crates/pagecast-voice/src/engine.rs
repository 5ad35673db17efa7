//! Playback engine abstraction.
//!
//! The sequencer drives audio through [`PlaybackEngine`] so it can be tested
//! without an output device. [`LocalPlaybackEngine`] is the production
//! implementation backed by the dedicated audio thread.

use crate::audio_thread::AudioThreadHandle;
use crate::error::PlaybackError;
use crate::pcm::{PlayableBuffer, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE, decode_pcm16};

/// Invoked once when a buffer finishes playing on its own.
pub type CompletionCallback = crate::playback::PlaybackDoneCallback;

/// Output device abstraction used by the playback sequencer.
///
/// Implementations play exactly one buffer at a time.
pub trait PlaybackEngine: Send + Sync {
    /// Make sure the output device is running. Idempotent.
    fn unlock(&self) -> Result<(), PlaybackError>;

    /// Decode synthesized speech into a playable buffer.
    ///
    /// CPU-bound; callers on an async runtime should run it on the
    /// blocking pool.
    fn decode(&self, bytes: &[u8]) -> Result<PlayableBuffer, PlaybackError> {
        decode_pcm16(bytes, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)
    }

    /// Stop the current buffer and play `buffer` from the start.
    ///
    /// `on_complete` fires exactly once, from another thread, when the buffer
    /// ends naturally. It must not fire after [`stop`](Self::stop).
    fn play(
        &self,
        buffer: PlayableBuffer,
        on_complete: CompletionCallback,
    ) -> Result<(), PlaybackError>;

    /// Halt and release the current buffer. Idempotent.
    fn stop(&self);

    /// Set output volume, clamped to `[0, 1]`. Applies to the current
    /// buffer and every later one.
    fn set_volume(&self, level: f32);
}

/// Plays audio on the default output device through `rodio`.
pub struct LocalPlaybackEngine {
    audio: AudioThreadHandle,
}

impl LocalPlaybackEngine {
    /// Spawn the audio thread. The device itself opens on first unlock.
    pub fn new() -> Result<Self, PlaybackError> {
        Ok(Self {
            audio: AudioThreadHandle::spawn()?,
        })
    }
}

impl PlaybackEngine for LocalPlaybackEngine {
    fn unlock(&self) -> Result<(), PlaybackError> {
        self.audio.unlock()
    }

    fn play(
        &self,
        buffer: PlayableBuffer,
        on_complete: CompletionCallback,
    ) -> Result<(), PlaybackError> {
        self.audio.play(buffer, on_complete)
    }

    fn stop(&self) {
        self.audio.stop();
    }

    fn set_volume(&self, level: f32) {
        self.audio.set_volume(level.clamp(0.0, 1.0));
    }
}
