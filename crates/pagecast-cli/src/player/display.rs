//! Terminal rendering for reader events.

use pagecast_core::Document;
use pagecast_voice::{PlaybackEvent, PlaybackSequencer, PlaybackState};

use crate::presentation::truncate_string;

const PREVIEW_CHARS: usize = 160;

/// One line describing an event, or `None` for events the reader doesn't show.
pub fn describe_event(event: &PlaybackEvent, sequencer: &PlaybackSequencer) -> Option<String> {
    match event {
        PlaybackEvent::SegmentStarted {
            segment_id,
            page_number,
        } => {
            let count = sequencer.segment_count().unwrap_or(0);
            let text = sequencer
                .segment(*segment_id)
                .map(|s| truncate_string(&s.text.replace('\n', " "), PREVIEW_CHARS))
                .unwrap_or_default();
            Some(format!(
                "> [p.{page_number} {}/{count}] {text}",
                segment_id + 1
            ))
        }
        PlaybackEvent::DocumentFinished => Some("End of document.".to_string()),
        PlaybackEvent::Error {
            segment_id,
            message,
        } => Some(format!(
            "! Paragraph {} failed: {message}. Press space to retry.",
            segment_id + 1
        )),
        PlaybackEvent::StateChanged(PlaybackState::Loading { segment_id, .. }) => {
            Some(format!("  loading paragraph {}...", segment_id + 1))
        }
        PlaybackEvent::StateChanged(_) | PlaybackEvent::SegmentFinished { .. } => None,
    }
}

/// Header printed when a document opens.
pub fn describe_opened(document: &Document, voice_label: &str) -> String {
    format!(
        "{} ({} paragraphs, {} pages), {:.0}% read, voice {voice_label}",
        document.title,
        document.total_segments,
        document.total_pages,
        document.progress_percent(),
    )
}

/// Current position and state.
pub fn describe_status(sequencer: &PlaybackSequencer, volume: f32) -> String {
    let status = sequencer.status();
    let state = if status.is_playing { "playing" } else { "paused" };
    let position = match (status.active_segment_id, sequencer.segment_count()) {
        (Some(id), Some(count)) => format!(
            "paragraph {}/{count}, page {}, {:.0}%",
            id + 1,
            sequencer.current_page().unwrap_or(1),
            sequencer.progress_percent().unwrap_or(0.0)
        ),
        _ => "no position".to_string(),
    };
    format!(
        "{state}: {position}, voice {}, volume {:.0}%",
        sequencer.voice().display_label,
        volume * 100.0
    )
}
