//! Shared CLI presentation utilities.
//!
//! Format-only helpers; no domain logic.

use chrono::{DateTime, Local, Utc};
use pagecast_core::Document;

/// Truncates a string to at most `max_chars` characters, adding "..." if needed.
///
/// # Examples
///
/// ```rust
/// use pagecast_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Local date and time, minute precision.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Print the library as a table, numbered from 1.
pub fn print_library(documents: &[Document]) {
    println!(
        "{:<3} {:<15} {:<32} {:>8} {:>6} {:>6}  Last read",
        "#", "ID", "Title", "Segments", "Pages", "Read"
    );
    print_separator(96);

    for (index, doc) in documents.iter().enumerate() {
        println!(
            "{:<3} {:<15} {:<32} {:>8} {:>6} {:>5.0}%  {}",
            index + 1,
            doc.id,
            truncate_string(&doc.title, 32),
            doc.total_segments,
            doc.total_pages,
            doc.progress_percent(),
            format_timestamp(doc.last_read_date),
        );
    }
}
