//! Extracted-text cleanup and segmentation.
//!
//! Raw text from PDF extractors is noisy: runs of spaces, words hyphenated
//! across line breaks, stacks of empty lines. This module normalises it and
//! splits each page into paragraph-sized [`Segment`]s on blank-line
//! boundaries.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{PageText, Segment};

/// Cleaned text shorter than this (in characters) is treated as a scanned
/// document with no usable text layer.
pub const SPARSE_TEXT_THRESHOLD: usize = 100;

/// Paragraph fragments of this many characters or fewer are discarded.
pub const MIN_SEGMENT_CHARS: usize = 5;

/// Pages shorter than this carry no readable text.
pub const MIN_PAGE_CHARS: usize = 10;

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("static regex"));

static HYPHENATED_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)-\s*\n\s*(\w+)").expect("static regex"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("static regex"));

/// Normalise raw extracted text.
///
/// - Runs of spaces/tabs collapse to a single space
/// - `amaz-\n ing` joins to `amazing`
/// - Three or more newlines squeeze to a paragraph break
pub fn clean_extracted_text(text: &str) -> String {
    let text = HORIZONTAL_SPACE.replace_all(text, " ");
    let text = HYPHENATED_BREAK.replace_all(&text, "$1$2");
    EXCESS_NEWLINES.replace_all(&text, "\n\n").into_owned()
}

/// Whether the extracted pages hold too little text to be worth reading.
///
/// Scanned PDFs come back from text-layer extractors as (nearly) empty
/// pages; callers use this to decide whether to try an OCR-capable source.
pub fn is_sparse(pages: &[PageText]) -> bool {
    let joined: String = pages.iter().map(|p| p.text.as_str()).collect();
    clean_extracted_text(&joined).chars().count() < SPARSE_TEXT_THRESHOLD
}

/// Whether no page carries readable text.
pub fn has_no_readable_text(pages: &[PageText]) -> bool {
    pages
        .iter()
        .all(|p| p.text.chars().count() < MIN_PAGE_CHARS)
}

/// Split cleaned page text into paragraphs.
fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    BLANK_LINE
        .split(text)
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_SEGMENT_CHARS)
}

/// Clean every page and split it into segments with sequential ids.
///
/// Segment ids run across pages, so the result is directly usable as a
/// document's playback order.
pub fn split_into_segments(pages: &[PageText]) -> Vec<Segment> {
    let mut segments = Vec::new();

    for page in pages {
        let cleaned = clean_extracted_text(&page.text);
        for paragraph in split_paragraphs(&cleaned) {
            segments.push(Segment {
                id: segments.len(),
                text: paragraph.to_string(),
                page_number: page.page_number,
            });
        }
    }

    segments
}

/// Split a plain-text dump into pages on form-feed characters.
///
/// `pdftotext` and similar tools separate pages with `\x0c`. A trailing
/// empty page after the final form feed is dropped.
pub fn split_pages(text: &str) -> Vec<PageText> {
    let mut pages: Vec<PageText> = text
        .split('\u{c}')
        .zip(1u32..)
        .map(|(page, number)| PageText::new(number, page))
        .collect();

    if pages.len() > 1 && pages.last().is_some_and(|p| p.text.trim().is_empty()) {
        pages.pop();
    }

    pages
}
