//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that parse CLI input, call the core services and format
//!   output for the terminal.

pub mod import;
pub mod list;
pub mod paths;
pub mod play;
pub mod remove;
pub mod settings;
pub mod voices;

use pagecast_core::Document;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Find a document by exact id, then by case-insensitive title.
pub async fn find_document(ctx: &CliContext, identifier: &str) -> Result<Document, CliError> {
    let documents = ctx.library.list().await?;
    select_document(&documents, identifier)
        .cloned()
        .ok_or_else(|| {
            CliError::Arguments(format!(
                "no document matches '{identifier}' (use 'pagecast list' to see the library)"
            ))
        })
}

/// Match `identifier` against a library listing.
///
/// Tries the id, then the 1-based list position, then the title. A title
/// matching several documents picks the most recent one.
pub fn select_document<'a>(documents: &'a [Document], identifier: &str) -> Option<&'a Document> {
    let identifier = identifier.trim();

    documents
        .iter()
        .find(|d| d.id == identifier)
        .or_else(|| {
            identifier
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| documents.get(index))
        })
        .or_else(|| {
            documents
                .iter()
                .find(|d| d.title.eq_ignore_ascii_case(identifier))
        })
}
