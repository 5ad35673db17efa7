//! Playback progress port.

/// Receives the segment id of every segment dispatched for playback.
///
/// Fire-and-forget: implementations must not block the caller and have no
/// way to apply backpressure.
pub trait ProgressSink: Send + Sync {
    fn record(&self, document_id: &str, segment_id: usize);
}

/// A progress sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn record(&self, _document_id: &str, _segment_id: usize) {}
}
