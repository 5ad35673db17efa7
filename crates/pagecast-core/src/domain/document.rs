//! Document and segment types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a document in the library.
pub type DocumentId = String;

/// Text extracted from a single page of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    /// 1-based page number.
    pub page_number: u32,
    /// Raw (uncleaned) text of the page.
    pub text: String,
}

impl PageText {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// One paragraph-sized unit of document text, the atomic unit of playback.
///
/// `id` is the segment's position in playback order and is stable for the
/// lifetime of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Sequence position (0-based, unique within a document).
    pub id: usize,
    /// Cleaned paragraph text.
    pub text: String,
    /// Page the paragraph was extracted from.
    pub page_number: u32,
}

/// A document in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Library identifier (creation timestamp in milliseconds).
    pub id: DocumentId,
    /// Display title, usually the source file stem.
    pub title: String,
    /// Ordered segments; order is playback order.
    pub segments: Vec<Segment>,
    /// Number of segments, kept alongside for list views.
    pub total_segments: usize,
    /// Last segment dispatched for playback.
    pub last_played_segment_id: usize,
    /// Page number of the final extracted page.
    pub total_pages: u32,
    /// When the document was imported.
    pub date_added: DateTime<Utc>,
    /// When playback progress was last recorded.
    pub last_read_date: DateTime<Utc>,
}

impl Document {
    /// Build a freshly imported document positioned at its first segment.
    pub fn new(
        id: impl Into<DocumentId>,
        title: impl Into<String>,
        segments: Vec<Segment>,
        total_pages: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            total_segments: segments.len(),
            segments,
            last_played_segment_id: 0,
            total_pages,
            date_added: now,
            last_read_date: now,
        }
    }

    /// Allocate a new document id from the current time.
    pub fn next_id(now: DateTime<Utc>) -> DocumentId {
        now.timestamp_millis().to_string()
    }

    /// Reading progress through the document as a percentage (0–100).
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percent(&self) -> f64 {
        if self.segments.len() <= 1 {
            return 0.0;
        }
        let last = (self.segments.len() - 1) as f64;
        (self.last_played_segment_id.min(self.segments.len() - 1) as f64 / last) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(n: usize) -> Vec<Segment> {
        (0..n)
            .map(|id| Segment {
                id,
                text: format!("Paragraph number {id}."),
                page_number: 1,
            })
            .collect()
    }

    #[test]
    fn new_document_starts_at_first_segment() {
        let now = Utc::now();
        let doc = Document::new("1", "Book", segments(3), 2, now);
        assert_eq!(doc.total_segments, 3);
        assert_eq!(doc.last_played_segment_id, 0);
        assert_eq!(doc.date_added, doc.last_read_date);
    }

    #[test]
    fn progress_percent_spans_first_to_last() {
        let mut doc = Document::new("1", "Book", segments(5), 1, Utc::now());
        assert!(doc.progress_percent().abs() < f64::EPSILON);
        doc.last_played_segment_id = 4;
        assert!((doc.progress_percent() - 100.0).abs() < f64::EPSILON);
        doc.last_played_segment_id = 2;
        assert!((doc.progress_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn progress_percent_single_segment_is_zero() {
        let doc = Document::new("1", "Book", segments(1), 1, Utc::now());
        assert!(doc.progress_percent().abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_camel_case() {
        let doc = Document::new("42", "Book", segments(1), 1, Utc::now());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["lastPlayedSegmentId"], 0);
        assert_eq!(json["segments"][0]["pageNumber"], 1);
    }
}
