#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod audio_thread;
pub mod engine;
pub mod error;
pub mod pcm;
pub mod playback;
pub mod sequencer;

// Re-export key types for convenience
pub use engine::{CompletionCallback, LocalPlaybackEngine, PlaybackEngine};
pub use error::PlaybackError;
pub use pcm::{PlayableBuffer, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE, decode_pcm16};
pub use sequencer::{
    PlaybackEvent, PlaybackSequencer, PlaybackState, PlaybackStatus, SequencerConfig,
};

#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use chrono as _;
#[cfg(test)]
use tokio_test as _;
