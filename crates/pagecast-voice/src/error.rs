//! Playback error types.

/// Errors that can occur while sequencing or playing audio.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlaybackError {
    /// The audio output device could not be opened or resumed.
    #[error("Audio output device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The speech source failed or returned no audio.
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailure(String),

    /// Synthesized audio could not be decoded.
    #[error("Could not decode audio: {0}")]
    DecodeError(String),

    /// A segment id outside the loaded document was requested.
    #[error("Segment {segment_id} is out of range (document has {segment_count} segments)")]
    OutOfRange {
        segment_id: usize,
        segment_count: usize,
    },

    /// No document is loaded into the sequencer.
    #[error("No document loaded")]
    NoDocument,

    /// The audio thread exited or stopped responding.
    #[error("Audio thread is not running")]
    AudioThreadDied,
}
