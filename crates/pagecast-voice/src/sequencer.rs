//! Playback sequencer: drives fetch → decode → play → advance over a document.
//!
//! ```text
//!   Stopped ──play_segment──► Loading ──audio ready──► Playing
//!      ▲                        │  ▲                     │
//!      │      pause / failure   │  └──── auto-advance ───┤
//!      └────────────────────────┴─────── end / pause ────┘
//! ```
//!
//! Every change of target or state mints a new generation. Work started
//! under an older generation checks the counter after synthesis, after
//! decode and in the completion callback, and abandons itself when it is no
//! longer current. Issuing a new request is the only way to cancel one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Duration;

use pagecast_core::{Document, ProgressSink, Segment, SpeechError, SpeechSource, VoiceSelector};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::engine::{CompletionCallback, PlaybackEngine};
use crate::error::PlaybackError;
use crate::pcm::PlayableBuffer;

// ── Playback state machine ─────────────────────────────────────────

/// Current state of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing in flight and no audio playing.
    Stopped,

    /// Speech for `segment_id` is being synthesized or decoded.
    Loading { segment_id: usize, generation: u64 },

    /// Audio for `segment_id` is playing.
    Playing { segment_id: usize, generation: u64 },
}

/// Snapshot of what the reader shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub active_segment_id: Option<usize>,
}

// ── Events emitted by the sequencer ────────────────────────────────

/// Events emitted by the sequencer to the front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Sequencer state changed.
    StateChanged(PlaybackState),

    /// Audio for a segment started playing.
    SegmentStarted { segment_id: usize, page_number: u32 },

    /// A segment played to the end.
    SegmentFinished { segment_id: usize },

    /// The last segment finished; playback stopped.
    DocumentFinished,

    /// Playing a segment failed. Position is kept.
    Error { segment_id: usize, message: String },
}

// ── Configuration ──────────────────────────────────────────────────

/// Configuration for the playback sequencer.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Voice used until [`PlaybackSequencer::change_voice`] is called.
    pub voice: VoiceSelector,

    /// Treat synthesis as failed after this long. `None` waits forever.
    pub synthesis_timeout: Option<Duration>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            voice: pagecast_core::default_voice(),
            synthesis_timeout: None,
        }
    }
}

// ── Shared state ───────────────────────────────────────────────────

/// The loaded document.
struct Session {
    document_id: String,
    segments: Arc<[Segment]>,
}

/// Everything guarded by the state mutex.
struct Inner {
    session: Option<Session>,
    active_segment_id: Option<usize>,
    is_playing: bool,
    state: PlaybackState,
}

struct Shared {
    engine: Arc<dyn PlaybackEngine>,
    speech: Arc<dyn SpeechSource>,
    progress: Arc<dyn ProgressSink>,
    generation: AtomicU64,
    inner: Mutex<Inner>,
    voice: RwLock<VoiceSelector>,
    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
    runtime: Handle,
    synthesis_timeout: Option<Duration>,
}

// ── Sequencer ──────────────────────────────────────────────────────

/// Plays a document segment by segment, advancing automatically.
///
/// Cheap to clone; clones drive the same playback. Every method is safe to
/// call while a request is in flight and none of them block on synthesis.
#[derive(Clone)]
pub struct PlaybackSequencer {
    shared: Arc<Shared>,
}

impl PlaybackSequencer {
    /// Create a new sequencer.
    ///
    /// Returns the sequencer and a receiver for [`PlaybackEvent`]s.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        speech: Arc<dyn SpeechSource>,
        progress: Arc<dyn ProgressSink>,
        config: SequencerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let shared = Shared {
            engine,
            speech,
            progress,
            generation: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                session: None,
                active_segment_id: None,
                is_playing: false,
                state: PlaybackState::Stopped,
            }),
            voice: RwLock::new(config.voice),
            event_tx,
            runtime: Handle::current(),
            synthesis_timeout: config.synthesis_timeout,
        };

        (
            Self {
                shared: Arc::new(shared),
            },
            event_rx,
        )
    }

    // ── Document lifecycle ─────────────────────────────────────────

    /// Install `document`, positioned at its last played segment.
    ///
    /// Any playback of a previous document is stopped and invalidated.
    pub fn load_document(&self, document: &Document) {
        let segments: Arc<[Segment]> = document.segments.clone().into();
        let active = segments
            .len()
            .checked_sub(1)
            .map(|last| document.last_played_segment_id.min(last));

        let mut inner = self.shared.lock();
        self.shared.invalidate();
        self.shared.engine.stop();
        inner.session = Some(Session {
            document_id: document.id.clone(),
            segments,
        });
        inner.active_segment_id = active;
        inner.is_playing = false;
        self.shared.set_state(&mut inner, PlaybackState::Stopped);

        tracing::info!(
            document_id = %document.id,
            segments = document.segments.len(),
            position = ?active,
            "Document loaded"
        );
    }

    /// Stop playback and forget the document.
    pub fn unload(&self) {
        let mut inner = self.shared.lock();
        self.shared.invalidate();
        self.shared.engine.stop();
        inner.session = None;
        inner.active_segment_id = None;
        inner.is_playing = false;
        self.shared.set_state(&mut inner, PlaybackState::Stopped);
    }

    // ── Transport controls ─────────────────────────────────────────

    /// Start playing segment `id`, superseding anything in flight.
    ///
    /// Returns once the request is dispatched; synthesis, decoding and
    /// playback continue in the background and report through events.
    pub fn play_segment(&self, id: usize) -> Result<(), PlaybackError> {
        self.shared.play_segment(id, None)
    }

    /// Stop audio and invalidate in-flight work. No-op when not playing.
    pub fn pause(&self) {
        let mut inner = self.shared.lock();
        self.shared.pause_locked(&mut inner);
    }

    /// Pause if playing, otherwise resume at the active segment.
    pub fn toggle_play_pause(&self) -> Result<(), PlaybackError> {
        let resume_at = {
            let mut inner = self.shared.lock();
            if inner.is_playing {
                self.shared.pause_locked(&mut inner);
                return Ok(());
            }
            inner.active_segment_id.ok_or(PlaybackError::NoDocument)?
        };
        self.play_segment(resume_at)
    }

    /// Jump to `percentage` (0–100) of the document.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn seek(&self, percentage: f64) -> Result<(), PlaybackError> {
        let count = self.segment_count().ok_or(PlaybackError::NoDocument)?;
        let fraction = percentage.clamp(0.0, 100.0) / 100.0;
        let target = ((fraction * count as f64).floor() as usize).min(count.saturating_sub(1));
        self.play_segment(target)
    }

    /// Jump to the first segment on or after `page`, or the last segment.
    pub fn go_to_page(&self, page: u32) -> Result<(), PlaybackError> {
        let target = {
            let inner = self.shared.lock();
            let session = inner.session.as_ref().ok_or(PlaybackError::NoDocument)?;
            session
                .segments
                .iter()
                .position(|s| s.page_number >= page)
                .unwrap_or_else(|| session.segments.len().saturating_sub(1))
        };
        self.play_segment(target)
    }

    /// Play the segment after the active one, if there is one.
    pub fn next(&self) -> Result<(), PlaybackError> {
        let target = {
            let inner = self.shared.lock();
            let session = inner.session.as_ref().ok_or(PlaybackError::NoDocument)?;
            inner
                .active_segment_id
                .map(|id| id + 1)
                .filter(|&id| id < session.segments.len())
        };
        target.map_or(Ok(()), |id| self.play_segment(id))
    }

    /// Play the segment before the active one, if there is one.
    pub fn previous(&self) -> Result<(), PlaybackError> {
        let target = {
            let inner = self.shared.lock();
            if inner.session.is_none() {
                return Err(PlaybackError::NoDocument);
            }
            inner.active_segment_id.and_then(|id| id.checked_sub(1))
        };
        target.map_or(Ok(()), |id| self.play_segment(id))
    }

    /// Switch voices. A playing segment restarts in the new voice.
    pub fn change_voice(&self, voice: VoiceSelector) -> Result<(), PlaybackError> {
        tracing::info!(voice = %voice.id, "Voice changed");
        *self
            .shared
            .voice
            .write()
            .unwrap_or_else(PoisonError::into_inner) = voice;

        let replay = {
            let inner = self.shared.lock();
            inner.active_segment_id.filter(|_| inner.is_playing)
        };
        replay.map_or(Ok(()), |id| self.play_segment(id))
    }

    /// Set output volume (0.0–1.0).
    pub fn set_volume(&self, level: f32) {
        self.shared.engine.set_volume(level.clamp(0.0, 1.0));
    }

    // ── Queries ────────────────────────────────────────────────────

    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        let inner = self.shared.lock();
        PlaybackStatus {
            is_playing: inner.is_playing,
            active_segment_id: inner.active_segment_id,
        }
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.shared.lock().state
    }

    /// The voice the next request will use.
    #[must_use]
    pub fn voice(&self) -> VoiceSelector {
        self.shared
            .voice
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Id of the loaded document.
    #[must_use]
    pub fn document_id(&self) -> Option<String> {
        self.shared
            .lock()
            .session
            .as_ref()
            .map(|s| s.document_id.clone())
    }

    #[must_use]
    pub fn segment_count(&self) -> Option<usize> {
        self.shared.lock().session.as_ref().map(|s| s.segments.len())
    }

    /// Segment `id` of the loaded document.
    #[must_use]
    pub fn segment(&self, id: usize) -> Option<Segment> {
        self.shared
            .lock()
            .session
            .as_ref()
            .and_then(|s| s.segments.get(id).cloned())
    }

    /// Position of the active segment as a percentage of the document.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percent(&self) -> Option<f64> {
        let inner = self.shared.lock();
        let count = inner.session.as_ref()?.segments.len();
        let active = inner.active_segment_id?;
        if count <= 1 {
            return Some(0.0);
        }
        Some(active as f64 / (count - 1) as f64 * 100.0)
    }

    /// Page of the active segment.
    #[must_use]
    pub fn current_page(&self) -> Option<u32> {
        let inner = self.shared.lock();
        let active = inner.active_segment_id?;
        inner
            .session
            .as_ref()?
            .segments
            .get(active)
            .map(|s| s.page_number)
    }
}

// ── Request pipeline ───────────────────────────────────────────────

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mint a new generation, invalidating all in-flight work.
    fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Dispatch a request for segment `id`.
    ///
    /// With `expected` set, the request is only issued if that generation is
    /// still current (auto-advance must not undo a pause that raced it).
    fn play_segment(
        self: &Arc<Self>,
        id: usize,
        expected: Option<u64>,
    ) -> Result<(), PlaybackError> {
        let (generation, document_id, segment) = {
            let mut inner = self.lock();
            if expected.is_some_and(|g| !self.is_current(g)) {
                return Ok(());
            }

            let session = inner.session.as_ref().ok_or(PlaybackError::NoDocument)?;
            let segment =
                session
                    .segments
                    .get(id)
                    .cloned()
                    .ok_or(PlaybackError::OutOfRange {
                        segment_id: id,
                        segment_count: session.segments.len(),
                    })?;
            let document_id = session.document_id.clone();

            let generation = self.invalidate();
            inner.is_playing = true;
            inner.active_segment_id = Some(id);
            self.engine.stop();
            self.set_state(
                &mut inner,
                PlaybackState::Loading {
                    segment_id: id,
                    generation,
                },
            );
            (generation, document_id, segment)
        };

        if let Err(e) = self.engine.unlock() {
            self.fail(generation, id, &e);
            return Err(e);
        }

        tracing::debug!(segment_id = id, generation, "Dispatching segment");
        self.progress.record(&document_id, id);

        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            shared.run_request(generation, segment).await;
        });

        Ok(())
    }

    /// Synthesize, decode and start audio for one request.
    async fn run_request(self: Arc<Self>, generation: u64, segment: Segment) {
        let voice = self
            .voice
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let synthesis = self.speech.synthesize(&segment.text, &voice);
        let result = match self.synthesis_timeout {
            Some(limit) => tokio::time::timeout(limit, synthesis)
                .await
                .unwrap_or_else(|_| {
                    Err(SpeechError::Request(format!(
                        "no response after {}s",
                        limit.as_secs_f32()
                    )))
                }),
            None => synthesis.await,
        };

        if !self.is_current(generation) {
            tracing::debug!(segment_id = segment.id, generation, "Discarding stale synthesis result");
            return;
        }

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail(
                    generation,
                    segment.id,
                    &PlaybackError::SynthesisFailure(e.to_string()),
                );
                return;
            }
        };

        let engine = Arc::clone(&self.engine);
        let decoded = tokio::task::spawn_blocking(move || engine.decode(&bytes))
            .await
            .unwrap_or_else(|e| Err(PlaybackError::DecodeError(format!("decode task failed: {e}"))))
            .and_then(|buffer| {
                if buffer.is_empty() {
                    Err(PlaybackError::DecodeError("no audio samples".to_string()))
                } else {
                    Ok(buffer)
                }
            });

        if !self.is_current(generation) {
            tracing::debug!(segment_id = segment.id, generation, "Discarding stale decoded audio");
            return;
        }

        match decoded {
            Ok(buffer) => self.start_audio(generation, &segment, buffer),
            Err(e) => self.fail(generation, segment.id, &e),
        }
    }

    /// Hand `buffer` to the engine if `generation` is still current.
    ///
    /// The check and the `play` call happen under the state lock, the same
    /// lock `pause` holds while bumping the generation.
    fn start_audio(self: &Arc<Self>, generation: u64, segment: &Segment, buffer: PlayableBuffer) {
        let mut inner = self.lock();
        if !self.is_current(generation) {
            tracing::debug!(segment_id = segment.id, generation, "Discarding stale audio before play");
            return;
        }

        let segment_id = segment.id;
        let weak: Weak<Self> = Arc::downgrade(self);
        let on_complete: CompletionCallback = Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                let runtime = shared.runtime.clone();
                runtime.spawn(async move {
                    shared.on_segment_finished(generation, segment_id);
                });
            }
        });

        let duration = buffer.duration();
        match self.engine.play(buffer, on_complete) {
            Ok(()) => {
                self.set_state(
                    &mut inner,
                    PlaybackState::Playing {
                        segment_id,
                        generation,
                    },
                );
                self.emit(PlaybackEvent::SegmentStarted {
                    segment_id,
                    page_number: segment.page_number,
                });
                tracing::debug!(segment_id, generation, ?duration, "Segment playing");
            }
            Err(e) => self.fail_locked(&mut inner, generation, segment_id, &e),
        }
    }

    /// Completion callback body: advance, or stop at the end of the document.
    fn on_segment_finished(self: &Arc<Self>, generation: u64, segment_id: usize) {
        let next = {
            let mut inner = self.lock();
            if !self.is_current(generation) {
                tracing::debug!(segment_id, generation, "Ignoring stale completion");
                return;
            }

            self.emit(PlaybackEvent::SegmentFinished { segment_id });

            let count = inner.session.as_ref().map_or(0, |s| s.segments.len());
            if segment_id + 1 < count {
                Some(segment_id + 1)
            } else {
                self.invalidate();
                inner.is_playing = false;
                self.set_state(&mut inner, PlaybackState::Stopped);
                self.emit(PlaybackEvent::DocumentFinished);
                tracing::info!("Reached end of document");
                None
            }
        };

        if let Some(next) = next {
            if let Err(e) = self.play_segment(next, Some(generation)) {
                tracing::warn!(segment_id = next, error = %e, "Auto-advance failed");
            }
        }
    }

    fn pause_locked(&self, inner: &mut Inner) {
        if !inner.is_playing {
            return;
        }
        let generation = self.invalidate();
        inner.is_playing = false;
        self.engine.stop();
        self.set_state(inner, PlaybackState::Stopped);
        tracing::debug!(generation, "Playback paused");
    }

    fn fail(&self, generation: u64, segment_id: usize, error: &PlaybackError) {
        let mut inner = self.lock();
        self.fail_locked(&mut inner, generation, segment_id, error);
    }

    /// Stop playing and report `error`, keeping the position.
    fn fail_locked(
        &self,
        inner: &mut Inner,
        generation: u64,
        segment_id: usize,
        error: &PlaybackError,
    ) {
        if !self.is_current(generation) {
            tracing::debug!(segment_id, generation, error = %error, "Ignoring stale failure");
            return;
        }

        tracing::warn!(segment_id, generation, error = %error, "Segment playback failed");
        inner.is_playing = false;
        self.set_state(inner, PlaybackState::Stopped);
        self.emit(PlaybackEvent::Error {
            segment_id,
            message: error.to_string(),
        });
    }

    fn set_state(&self, inner: &mut Inner, new_state: PlaybackState) {
        if inner.state != new_state {
            tracing::debug!(old = ?inner.state, new = ?new_state, "Playback state transition");
            inner.state = new_state;
            self.emit(PlaybackEvent::StateChanged(new_state));
        }
    }

    /// Emit an event (best-effort: a dropped receiver is logged).
    fn emit(&self, event: PlaybackEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::warn!("Playback event receiver dropped");
        }
    }
}
