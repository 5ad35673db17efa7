//! Integration tests for the `PlaybackSequencer` state machine.
//!
//! These tests drive the sequencer with a fake playback engine and fake
//! speech sources. No audio hardware or network access is required.
//!
//! # What is tested
//!
//! - Successful dispatch, auto-advance and end-of-document stop
//! - Later requests superseding earlier ones, in either resolution order
//! - Pause before synthesis or decode finishes never starts audio
//! - Stale completion callbacks are ignored
//! - Synthesis, decode and device failures keep the position
//! - Seek, go-to-page, next/previous, voice change and toggle semantics
//! - Progress reporting and the optional synthesis timeout

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pagecast_core::{
    Document, ProgressSink, Segment, SpeechError, SpeechSource, VoiceSelector, find_voice,
};
use pagecast_voice::{
    CompletionCallback, PlayableBuffer, PlaybackEngine, PlaybackError, PlaybackEvent,
    PlaybackSequencer, PlaybackState, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE, SequencerConfig,
    decode_pcm16,
};
use tokio::sync::{mpsc, oneshot};

// ── Fake engine ────────────────────────────────────────────────────

/// Records every call; completion is triggered by the test.
#[derive(Default)]
struct FakeEngine {
    plays: Mutex<Vec<usize>>,
    current: Mutex<Option<CompletionCallback>>,
    superseded: Mutex<Vec<CompletionCallback>>,
    stops: AtomicUsize,
    volume: Mutex<Option<f32>>,
    unlock_fails: AtomicBool,
    decode_gate: Mutex<Option<Arc<DecodeGate>>>,
}

/// Holds every decode until released.
#[derive(Default)]
struct DecodeGate {
    open: Mutex<bool>,
    opened: Condvar,
    entered: AtomicUsize,
}

impl DecodeGate {
    fn pass(&self) {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
    }

    fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

impl FakeEngine {
    /// Make every later decode wait for the returned gate.
    fn gate_decode(&self) -> Arc<DecodeGate> {
        let gate = Arc::new(DecodeGate::default());
        *self.decode_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn play_count(&self) -> usize {
        self.plays.lock().unwrap().len()
    }

    /// Let the current buffer end naturally.
    fn finish_current(&self) {
        let callback = self.current.lock().unwrap().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Fire callbacks of buffers that were stopped or replaced, simulating
    /// a completion that raced the stop.
    fn fire_superseded(&self) {
        let callbacks: Vec<_> = self.superseded.lock().unwrap().drain(..).collect();
        for callback in callbacks {
            callback();
        }
    }

    fn retire_current(&self) {
        if let Some(old) = self.current.lock().unwrap().take() {
            self.superseded.lock().unwrap().push(old);
        }
    }
}

impl PlaybackEngine for FakeEngine {
    fn unlock(&self) -> Result<(), PlaybackError> {
        if self.unlock_fails.load(Ordering::SeqCst) {
            return Err(PlaybackError::DeviceUnavailable("no device".to_string()));
        }
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<PlayableBuffer, PlaybackError> {
        let gate = self.decode_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass();
        }
        decode_pcm16(bytes, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)
    }

    fn play(
        &self,
        buffer: PlayableBuffer,
        on_complete: CompletionCallback,
    ) -> Result<(), PlaybackError> {
        self.retire_current();
        *self.current.lock().unwrap() = Some(on_complete);
        self.plays.lock().unwrap().push(buffer.len());
        Ok(())
    }

    fn stop(&self) {
        self.retire_current();
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn set_volume(&self, level: f32) {
        *self.volume.lock().unwrap() = Some(level);
    }
}

// ── Fake speech sources ────────────────────────────────────────────

/// 10 ms of silence at 24 kHz, as 16-bit PCM.
fn silence() -> Vec<u8> {
    vec![0u8; 480]
}

/// Answers immediately with canned bytes (or an error).
struct InstantSpeech {
    reply: Result<Vec<u8>, String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl InstantSpeech {
    fn ok() -> Arc<Self> {
        Self::with(Ok(silence()))
    }

    fn with(reply: Result<Vec<u8>, String>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn voices(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, voice)| voice.clone())
            .collect()
    }
}

#[async_trait]
impl SpeechSource for InstantSpeech {
    async fn synthesize(&self, text: &str, voice: &VoiceSelector) -> Result<Vec<u8>, SpeechError> {
        self.requests
            .lock()
            .unwrap()
            .push((text.to_string(), voice.id.clone()));
        self.reply.clone().map_err(SpeechError::Request)
    }
}

struct PendingRequest {
    text: String,
    voice: String,
    reply: oneshot::Sender<Result<Vec<u8>, SpeechError>>,
}

/// Holds every request until the test resolves it.
#[derive(Default)]
struct GatedSpeech {
    pending: Mutex<Vec<PendingRequest>>,
    issued: AtomicUsize,
}

impl GatedSpeech {
    fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    fn voice_of(&self, text: &str) -> Option<String> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.text == text)
            .map(|p| p.voice.clone())
    }

    /// Complete the oldest pending request for `text`.
    fn resolve(&self, text: &str) {
        let mut pending = self.pending.lock().unwrap();
        let index = pending
            .iter()
            .position(|p| p.text == text)
            .unwrap_or_else(|| panic!("no pending request for {text:?}"));
        let request = pending.remove(index);
        let _ = request.reply.send(Ok(silence()));
    }
}

#[async_trait]
impl SpeechSource for GatedSpeech {
    async fn synthesize(&self, text: &str, voice: &VoiceSelector) -> Result<Vec<u8>, SpeechError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push(PendingRequest {
            text: text.to_string(),
            voice: voice.id.clone(),
            reply: tx,
        });
        self.issued.fetch_add(1, Ordering::SeqCst);
        rx.await
            .unwrap_or_else(|_| Err(SpeechError::Request("request dropped".to_string())))
    }
}

// ── Progress sink ──────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<(String, usize)>>,
}

impl RecordingSink {
    fn segment_ids(&self) -> Vec<usize> {
        self.records.lock().unwrap().iter().map(|(_, id)| *id).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn record(&self, document_id: &str, segment_id: usize) {
        self.records
            .lock()
            .unwrap()
            .push((document_id.to_string(), segment_id));
    }
}

// ── Helpers ────────────────────────────────────────────────────────

struct Harness {
    sequencer: PlaybackSequencer,
    engine: Arc<FakeEngine>,
    progress: Arc<RecordingSink>,
    events: mpsc::UnboundedReceiver<PlaybackEvent>,
}

fn harness(speech: Arc<dyn SpeechSource>) -> Harness {
    harness_with_config(speech, SequencerConfig::default())
}

fn harness_with_config(speech: Arc<dyn SpeechSource>, config: SequencerConfig) -> Harness {
    let engine = Arc::new(FakeEngine::default());
    let progress = Arc::new(RecordingSink::default());
    let (sequencer, events) =
        PlaybackSequencer::new(engine.clone(), speech, progress.clone(), config);
    Harness {
        sequencer,
        engine,
        progress,
        events,
    }
}

fn segment_text(id: usize) -> String {
    format!("Paragraph number {id}.")
}

/// A document whose segment `i` sits on `pages[i]`.
fn document_on_pages(pages: &[u32]) -> Document {
    let segments = pages
        .iter()
        .enumerate()
        .map(|(id, &page_number)| Segment {
            id,
            text: segment_text(id),
            page_number,
        })
        .collect();
    let total_pages = pages.last().copied().unwrap_or(1);
    Document::new("doc-1", "Test Book", segments, total_pages, chrono::Utc::now())
}

fn document(count: usize) -> Document {
    document_on_pages(&vec![1; count])
}

/// Poll `condition` until it holds, failing the test after two seconds.
async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within 2s");
}

/// Give spawned tasks time to run to completion.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Drain all pending events from the event receiver and return them.
fn drain_events(rx: &mut mpsc::UnboundedReceiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}

fn started_segments(events: &[PlaybackEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::SegmentStarted { segment_id, .. } => Some(*segment_id),
            _ => None,
        })
        .collect()
}

fn error_segments(events: &[PlaybackEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::Error { segment_id, .. } => Some(*segment_id),
            _ => None,
        })
        .collect()
}

// ── Dispatch ───────────────────────────────────────────────────────

#[tokio::test]
async fn play_segment_plays_and_marks_active() {
    let mut h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(5));

    h.sequencer.play_segment(2).unwrap();

    let status = h.sequencer.status();
    assert!(status.is_playing);
    assert_eq!(status.active_segment_id, Some(2));

    wait_until(|| h.engine.play_count() == 1).await;
    assert!(matches!(
        h.sequencer.state(),
        PlaybackState::Playing { segment_id: 2, .. }
    ));
    assert_eq!(h.engine.plays.lock().unwrap()[0], 240);

    let events = drain_events(&mut h.events);
    assert_eq!(started_segments(&events), vec![2]);
}

#[tokio::test]
async fn play_segment_reports_loading_then_playing() {
    let mut h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(3));
    drain_events(&mut h.events);

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| h.engine.play_count() == 1).await;

    let states: Vec<_> = drain_events(&mut h.events)
        .into_iter()
        .filter_map(|e| match e {
            PlaybackEvent::StateChanged(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(states.len(), 2);
    assert!(matches!(states[0], PlaybackState::Loading { segment_id: 0, .. }));
    assert!(matches!(states[1], PlaybackState::Playing { segment_id: 0, .. }));
}

#[tokio::test]
async fn play_segment_without_document_fails() {
    let h = harness(InstantSpeech::ok());
    let err = h.sequencer.play_segment(0).unwrap_err();
    assert!(matches!(err, PlaybackError::NoDocument));
}

#[tokio::test]
async fn out_of_range_leaves_state_untouched() {
    let h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(3));
    let before = h.sequencer.status();

    let err = h.sequencer.play_segment(3).unwrap_err();

    assert!(matches!(
        err,
        PlaybackError::OutOfRange {
            segment_id: 3,
            segment_count: 3
        }
    ));
    assert_eq!(h.sequencer.status(), before);
    assert_eq!(h.sequencer.state(), PlaybackState::Stopped);
    assert!(h.progress.segment_ids().is_empty());
}

// ── Supersession ───────────────────────────────────────────────────

#[tokio::test]
async fn later_request_wins_when_earlier_resolves_first() {
    let speech = Arc::new(GatedSpeech::default());
    let mut h = harness(speech.clone());
    h.sequencer.load_document(&document(5));

    h.sequencer.play_segment(1).unwrap();
    wait_until(|| speech.issued() == 1).await;
    h.sequencer.play_segment(3).unwrap();
    wait_until(|| speech.issued() == 2).await;

    speech.resolve(&segment_text(1));
    settle().await;
    assert_eq!(h.engine.play_count(), 0);

    speech.resolve(&segment_text(3));
    wait_until(|| h.engine.play_count() == 1).await;

    assert_eq!(started_segments(&drain_events(&mut h.events)), vec![3]);
    assert_eq!(h.sequencer.status().active_segment_id, Some(3));
}

#[tokio::test]
async fn later_request_wins_when_it_resolves_first() {
    let speech = Arc::new(GatedSpeech::default());
    let mut h = harness(speech.clone());
    h.sequencer.load_document(&document(5));

    h.sequencer.play_segment(1).unwrap();
    wait_until(|| speech.issued() == 1).await;
    h.sequencer.play_segment(3).unwrap();
    wait_until(|| speech.issued() == 2).await;

    speech.resolve(&segment_text(3));
    wait_until(|| h.engine.play_count() == 1).await;
    speech.resolve(&segment_text(1));
    settle().await;

    assert_eq!(h.engine.play_count(), 1);
    assert_eq!(started_segments(&drain_events(&mut h.events)), vec![3]);
}

#[tokio::test]
async fn pause_before_resolution_never_starts_audio() {
    let speech = Arc::new(GatedSpeech::default());
    let h = harness(speech.clone());
    h.sequencer.load_document(&document(3));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| speech.issued() == 1).await;
    h.sequencer.pause();

    speech.resolve(&segment_text(0));
    settle().await;

    assert_eq!(h.engine.play_count(), 0);
    let status = h.sequencer.status();
    assert!(!status.is_playing);
    assert_eq!(status.active_segment_id, Some(0));
    assert_eq!(h.sequencer.state(), PlaybackState::Stopped);
}

#[tokio::test]
async fn pause_during_decode_never_starts_audio() {
    let mut h = harness(InstantSpeech::ok());
    let gate = h.engine.gate_decode();
    h.sequencer.load_document(&document(3));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| gate.entered() == 1).await;
    h.sequencer.pause();
    gate.release();
    settle().await;

    assert_eq!(h.engine.play_count(), 0);
    assert_eq!(h.sequencer.state(), PlaybackState::Stopped);
    let events = drain_events(&mut h.events);
    assert!(started_segments(&events).is_empty());
    assert!(error_segments(&events).is_empty());
}

#[tokio::test]
async fn later_request_during_decode_wins() {
    let mut h = harness(InstantSpeech::ok());
    let gate = h.engine.gate_decode();
    h.sequencer.load_document(&document(4));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| gate.entered() == 1).await;
    h.sequencer.play_segment(2).unwrap();
    wait_until(|| gate.entered() == 2).await;
    gate.release();
    settle().await;

    assert_eq!(h.engine.play_count(), 1);
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));
    let events = drain_events(&mut h.events);
    assert_eq!(started_segments(&events), vec![2]);
    assert!(error_segments(&events).is_empty());
}

// ── Completion ─────────────────────────────────────────────────────

#[tokio::test]
async fn completion_advances_and_stops_at_end() {
    let mut h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(3));

    h.sequencer.play_segment(1).unwrap();
    wait_until(|| h.engine.play_count() == 1).await;

    h.engine.finish_current();
    wait_until(|| h.engine.play_count() == 2).await;
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));

    h.engine.finish_current();
    wait_until(|| !h.sequencer.status().is_playing).await;

    assert_eq!(h.engine.play_count(), 2);
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));
    assert_eq!(h.sequencer.state(), PlaybackState::Stopped);

    let events = drain_events(&mut h.events);
    assert_eq!(started_segments(&events), vec![1, 2]);
    assert!(events.contains(&PlaybackEvent::SegmentFinished { segment_id: 1 }));
    assert!(events.contains(&PlaybackEvent::SegmentFinished { segment_id: 2 }));
    assert_eq!(events.last(), Some(&PlaybackEvent::DocumentFinished));
}

#[tokio::test]
async fn stale_completion_is_ignored() {
    let mut h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(5));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| h.engine.play_count() == 1).await;
    h.sequencer.play_segment(2).unwrap();
    wait_until(|| h.engine.play_count() == 2).await;

    h.engine.fire_superseded();
    settle().await;

    assert_eq!(h.engine.play_count(), 2);
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));
    let events = drain_events(&mut h.events);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, PlaybackEvent::SegmentFinished { .. }))
    );
}

#[tokio::test]
async fn completion_after_pause_does_not_advance() {
    let h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(3));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| h.engine.play_count() == 1).await;
    let stops_before = h.engine.stops.load(Ordering::SeqCst);
    h.sequencer.pause();
    assert_eq!(h.engine.stops.load(Ordering::SeqCst), stops_before + 1);
    h.engine.fire_superseded();
    settle().await;

    assert_eq!(h.engine.play_count(), 1);
    assert!(!h.sequencer.status().is_playing);
    assert_eq!(h.sequencer.status().active_segment_id, Some(0));
}

// ── Failures ───────────────────────────────────────────────────────

#[tokio::test]
async fn synthesis_failure_stops_and_keeps_position() {
    let mut h = harness(InstantSpeech::with(Err("quota exceeded".to_string())));
    h.sequencer.load_document(&document(3));

    h.sequencer.play_segment(1).unwrap();
    wait_until(|| h.sequencer.state() == PlaybackState::Stopped).await;

    let status = h.sequencer.status();
    assert!(!status.is_playing);
    assert_eq!(status.active_segment_id, Some(1));
    assert_eq!(h.engine.play_count(), 0);

    let events = drain_events(&mut h.events);
    assert_eq!(error_segments(&events), vec![1]);
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::Error { message, .. } if message.contains("quota exceeded")
    )));
}

#[tokio::test]
async fn odd_length_audio_is_decode_error() {
    let mut h = harness(InstantSpeech::with(Ok(vec![0u8; 3])));
    h.sequencer.load_document(&document(2));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| h.sequencer.state() == PlaybackState::Stopped).await;

    assert_eq!(h.engine.play_count(), 0);
    assert_eq!(error_segments(&drain_events(&mut h.events)), vec![0]);
}

#[tokio::test]
async fn empty_audio_is_decode_error() {
    let mut h = harness(InstantSpeech::with(Ok(Vec::new())));
    h.sequencer.load_document(&document(2));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| h.sequencer.state() == PlaybackState::Stopped).await;

    assert_eq!(h.engine.play_count(), 0);
    assert!(!h.sequencer.status().is_playing);
    assert_eq!(error_segments(&drain_events(&mut h.events)), vec![0]);
}

#[tokio::test]
async fn device_failure_is_reported_synchronously() {
    let mut h = harness(InstantSpeech::ok());
    h.engine.unlock_fails.store(true, Ordering::SeqCst);
    h.sequencer.load_document(&document(2));

    let err = h.sequencer.play_segment(1).unwrap_err();

    assert!(matches!(err, PlaybackError::DeviceUnavailable(_)));
    let status = h.sequencer.status();
    assert!(!status.is_playing);
    assert_eq!(status.active_segment_id, Some(1));
    assert_eq!(error_segments(&drain_events(&mut h.events)), vec![1]);
    // Never dispatched, so the saved position is untouched.
    assert!(h.progress.segment_ids().is_empty());
}

#[tokio::test]
async fn device_recovery_records_progress_once_dispatched() {
    let h = harness(InstantSpeech::ok());
    h.engine.unlock_fails.store(true, Ordering::SeqCst);
    h.sequencer.load_document(&document(3));

    assert!(h.sequencer.play_segment(2).is_err());
    h.engine.unlock_fails.store(false, Ordering::SeqCst);
    h.sequencer.play_segment(1).unwrap();

    assert_eq!(h.progress.segment_ids(), vec![1]);
}

#[tokio::test]
async fn hung_synthesis_times_out() {
    let speech = Arc::new(GatedSpeech::default());
    let config = SequencerConfig {
        synthesis_timeout: Some(Duration::from_millis(50)),
        ..SequencerConfig::default()
    };
    let mut h = harness_with_config(speech.clone(), config);
    h.sequencer.load_document(&document(2));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| h.sequencer.state() == PlaybackState::Stopped).await;

    assert_eq!(speech.issued(), 1);
    assert_eq!(h.engine.play_count(), 0);
    assert_eq!(error_segments(&drain_events(&mut h.events)), vec![0]);
}

// ── Navigation ─────────────────────────────────────────────────────

#[tokio::test]
async fn seek_maps_percentage_to_segment() {
    let h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(10));

    h.sequencer.seek(50.0).unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(5));

    h.sequencer.seek(100.0).unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(9));

    h.sequencer.seek(0.0).unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(0));

    h.sequencer.seek(33.0).unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(3));
}

#[tokio::test]
async fn go_to_page_picks_first_segment_on_or_after_page() {
    let h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document_on_pages(&[1, 1, 2, 2, 3, 4]));

    h.sequencer.go_to_page(3).unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(4));

    h.sequencer.go_to_page(2).unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));
    assert_eq!(h.sequencer.current_page(), Some(2));

    h.sequencer.go_to_page(9).unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(5));
}

#[tokio::test]
async fn next_and_previous_stay_in_range() {
    let h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(3));

    h.sequencer.play_segment(0).unwrap();
    h.sequencer.previous().unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(0));

    h.sequencer.next().unwrap();
    h.sequencer.next().unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));

    h.sequencer.next().unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));

    h.sequencer.previous().unwrap();
    assert_eq!(h.sequencer.status().active_segment_id, Some(1));

    assert_eq!(h.progress.segment_ids(), vec![0, 1, 2, 1]);
}

#[tokio::test]
async fn toggle_pauses_and_resumes_at_active_segment() {
    let h = harness(InstantSpeech::ok());
    let mut doc = document(5);
    doc.last_played_segment_id = 2;
    h.sequencer.load_document(&doc);

    h.sequencer.toggle_play_pause().unwrap();
    wait_until(|| h.engine.play_count() == 1).await;
    assert!(h.sequencer.status().is_playing);

    h.sequencer.toggle_play_pause().unwrap();
    assert!(!h.sequencer.status().is_playing);
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));

    h.sequencer.toggle_play_pause().unwrap();
    wait_until(|| h.engine.play_count() == 2).await;
    assert_eq!(h.sequencer.status().active_segment_id, Some(2));
    assert_eq!(h.progress.segment_ids(), vec![2, 2]);
}

// ── Voice ──────────────────────────────────────────────────────────

#[tokio::test]
async fn voice_change_while_playing_restarts_segment() {
    let speech = Arc::new(GatedSpeech::default());
    let h = harness(speech.clone());
    h.sequencer.load_document(&document(3));

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| speech.issued() == 1).await;
    assert_eq!(speech.voice_of(&segment_text(0)).as_deref(), Some("Puck"));

    h.sequencer.change_voice(find_voice("Kore").unwrap()).unwrap();
    wait_until(|| speech.issued() == 2).await;

    // The first request is stale; the reissued one uses the new voice.
    speech.resolve(&segment_text(0));
    settle().await;
    assert_eq!(h.engine.play_count(), 0);
    assert_eq!(speech.voice_of(&segment_text(0)).as_deref(), Some("Kore"));

    speech.resolve(&segment_text(0));
    wait_until(|| h.engine.play_count() == 1).await;
    assert_eq!(h.sequencer.status().active_segment_id, Some(0));
}

#[tokio::test]
async fn voice_change_while_paused_applies_to_next_play() {
    let speech = InstantSpeech::ok();
    let h = harness(speech.clone());
    h.sequencer.load_document(&document(3));

    h.sequencer.change_voice(find_voice("Aoede").unwrap()).unwrap();
    settle().await;
    assert!(speech.voices().is_empty());
    assert_eq!(h.sequencer.voice().id, "Aoede");

    h.sequencer.play_segment(0).unwrap();
    wait_until(|| h.engine.play_count() == 1).await;
    assert_eq!(speech.voices(), vec!["Aoede".to_string()]);
}

// ── Document lifecycle ─────────────────────────────────────────────

#[tokio::test]
async fn load_document_clamps_saved_position() {
    let h = harness(InstantSpeech::ok());
    let mut doc = document_on_pages(&[1, 2, 3]);
    doc.last_played_segment_id = 99;

    h.sequencer.load_document(&doc);

    let status = h.sequencer.status();
    assert!(!status.is_playing);
    assert_eq!(status.active_segment_id, Some(2));
    assert_eq!(h.sequencer.current_page(), Some(3));
    assert_eq!(h.sequencer.progress_percent(), Some(100.0));
    assert_eq!(h.sequencer.document_id().as_deref(), Some("doc-1"));
}

#[tokio::test]
async fn progress_percent_uses_last_index() {
    let h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(5));
    h.sequencer.play_segment(2).unwrap();
    assert_eq!(h.sequencer.progress_percent(), Some(50.0));

    h.sequencer.load_document(&document(1));
    assert_eq!(h.sequencer.progress_percent(), Some(0.0));
}

#[tokio::test]
async fn unload_invalidates_in_flight_request() {
    let speech = Arc::new(GatedSpeech::default());
    let h = harness(speech.clone());
    h.sequencer.load_document(&document(3));

    h.sequencer.play_segment(1).unwrap();
    wait_until(|| speech.issued() == 1).await;
    h.sequencer.unload();
    speech.resolve(&segment_text(1));
    settle().await;

    assert_eq!(h.engine.play_count(), 0);
    assert_eq!(h.sequencer.status().active_segment_id, None);
    assert!(matches!(
        h.sequencer.play_segment(0),
        Err(PlaybackError::NoDocument)
    ));
}

#[tokio::test]
async fn progress_records_every_dispatch() {
    let h = harness(InstantSpeech::ok());
    h.sequencer.load_document(&document(5));

    h.sequencer.play_segment(1).unwrap();
    h.sequencer.play_segment(3).unwrap();
    wait_until(|| h.engine.play_count() >= 1).await;

    let records = h.progress.records.lock().unwrap().clone();
    assert_eq!(
        records,
        vec![("doc-1".to_string(), 1), ("doc-1".to_string(), 3)]
    );
}

#[tokio::test]
async fn set_volume_is_clamped() {
    let h = harness(InstantSpeech::ok());
    h.sequencer.set_volume(1.7);
    assert_eq!(*h.engine.volume.lock().unwrap(), Some(1.0));
    h.sequencer.set_volume(-0.3);
    assert_eq!(*h.engine.volume.lock().unwrap(), Some(0.0));
}
