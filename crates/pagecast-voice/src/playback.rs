//! Audio playback via `rodio`.
//!
//! Owns the output stream and at most one sink. Every sink gets its own
//! liveness flag, so a watcher left over from a stopped sink can never fire
//! the completion callback of a later one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::error::PlaybackError;
use crate::pcm::PlayableBuffer;

/// Callback invoked when playback finishes naturally (all queued audio drained).
pub type PlaybackDoneCallback = Box<dyn FnOnce() + Send + 'static>;

/// A sink together with the flag its completion watcher consults.
struct ActiveSink {
    sink: Arc<Sink>,
    live: Arc<AtomicBool>,
}

/// Audio output for synthesized speech.
pub struct AudioPlayback {
    /// rodio output stream (must be kept alive).
    _stream: OutputStream,

    /// Handle used to create sinks.
    stream_handle: OutputStreamHandle,

    /// Sink of the buffer currently playing, if any.
    current: Option<ActiveSink>,

    /// Volume applied to the current sink and every later one.
    volume: f32,
}

impl AudioPlayback {
    /// Open the default output device.
    pub fn open(volume: f32) -> Result<Self, PlaybackError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| PlaybackError::DeviceUnavailable(e.to_string()))?;

        tracing::info!("Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            current: None,
            volume: volume.clamp(0.0, 1.0),
        })
    }

    /// Play `buffer` from the start, replacing whatever is playing.
    ///
    /// `on_done` fires once when the buffer drains naturally. It never fires
    /// if [`stop`](Self::stop) or another `play` comes first.
    pub fn play(
        &mut self,
        buffer: PlayableBuffer,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), PlaybackError> {
        self.stop();

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| PlaybackError::DeviceUnavailable(e.to_string()))?;
        sink.set_volume(self.volume);

        let duration = buffer.duration();
        let channels = buffer.channels();
        let sample_rate = buffer.sample_rate();
        sink.append(SamplesBuffer::new(
            channels,
            sample_rate,
            buffer.into_samples(),
        ));

        let active = ActiveSink {
            sink: Arc::new(sink),
            live: Arc::new(AtomicBool::new(true)),
        };
        spawn_completion_watcher(&active, on_done)?;
        self.current = Some(active);

        tracing::debug!(sample_rate, ?duration, "Audio playback started");
        Ok(())
    }

    /// Stop the current buffer, if any. Its completion callback is discarded.
    pub fn stop(&mut self) {
        if let Some(active) = self.current.take() {
            active.live.store(false, Ordering::SeqCst);
            active.sink.stop();
            tracing::debug!("Audio playback stopped");
        }
    }

    /// Set playback volume (0.0 = muted, 1.0 = full).
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(active) = &self.current {
            active.sink.set_volume(self.volume);
        }
    }
}

impl Drop for AudioPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Block a helper thread on the sink; on natural drain, fire `on_done`.
///
/// `sleep_until_end()` also returns when the sink is stopped, so the
/// liveness flag decides which of the two happened.
fn spawn_completion_watcher(
    active: &ActiveSink,
    on_done: PlaybackDoneCallback,
) -> Result<(), PlaybackError> {
    let sink = Arc::clone(&active.sink);
    let live = Arc::clone(&active.live);

    thread::Builder::new()
        .name("pagecast-playback-watch".into())
        .spawn(move || {
            sink.sleep_until_end();

            if !live.swap(false, Ordering::SeqCst) {
                return;
            }

            tracing::debug!("Playback finished naturally");
            on_done();
        })
        .map(|_| ())
        .map_err(|e| {
            PlaybackError::DeviceUnavailable(format!("failed to spawn playback watcher: {e}"))
        })
}
