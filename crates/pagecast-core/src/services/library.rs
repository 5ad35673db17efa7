//! Library service: document import and bookkeeping.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::domain::{Document, PageText};
use crate::ports::{DocumentRepository, RepositoryError, TextSource};
use crate::text::{has_no_readable_text, is_sparse, split_into_segments};

/// Errors from library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// No readable text could be obtained from the document.
    #[error("Could not extract readable text: {0}")]
    ExtractionFailure(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Imports documents into the library and manages stored documents.
///
/// Import runs the primary [`TextSource`] first. When it fails, or yields
/// so little text that the document is probably scanned, the optional
/// fallback source is tried and its output is treated as a single page.
pub struct LibraryService {
    repo: Arc<dyn DocumentRepository>,
    primary: Arc<dyn TextSource>,
    fallback: Option<Arc<dyn TextSource>>,
}

impl LibraryService {
    pub fn new(repo: Arc<dyn DocumentRepository>, primary: Arc<dyn TextSource>) -> Self {
        Self {
            repo,
            primary,
            fallback: None,
        }
    }

    /// Use `fallback` for documents the primary source cannot read.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn TextSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Extract, segment and save a new document.
    pub async fn import(&self, title: &str, bytes: &[u8]) -> Result<Document, LibraryError> {
        let pages = self.extract_pages(bytes).await?;

        if has_no_readable_text(&pages) {
            return Err(LibraryError::ExtractionFailure(
                "no page contains readable text".to_string(),
            ));
        }

        let segments = split_into_segments(&pages);
        if segments.is_empty() {
            return Err(LibraryError::ExtractionFailure("no text found".to_string()));
        }

        let total_pages = pages.last().map_or(1, |p| p.page_number);
        let now = Utc::now();
        let document = Document::new(Document::next_id(now), title, segments, total_pages, now);

        self.repo.save(&document).await?;

        tracing::info!(
            document_id = %document.id,
            title = %document.title,
            segments = document.total_segments,
            pages = document.total_pages,
            "Imported document"
        );

        Ok(document)
    }

    async fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>, LibraryError> {
        let primary = match self.primary.extract(bytes).await {
            Ok(pages) => Ok(pages),
            Err(e) => {
                tracing::warn!(source = self.primary.name(), error = %e, "Primary extraction failed");
                Err(e)
            }
        };

        let needs_fallback = primary.as_ref().map_or(true, |pages| is_sparse(pages));
        let Some(fallback) = self.fallback.as_ref().filter(|_| needs_fallback) else {
            return primary.map_err(|e| LibraryError::ExtractionFailure(e.to_string()));
        };

        tracing::info!(source = fallback.name(), "Sparse text layer, using fallback extractor");

        let pages = fallback
            .extract(bytes)
            .await
            .map_err(|e| LibraryError::ExtractionFailure(e.to_string()))?;

        let text = pages
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(vec![PageText::new(1, text)])
    }

    /// List documents, most recently saved first.
    pub async fn list(&self) -> Result<Vec<Document>, LibraryError> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Document, LibraryError> {
        Ok(self.repo.get(id).await?)
    }

    /// Record the reading position of a document.
    pub async fn update_progress(&self, id: &str, segment_id: usize) -> Result<(), LibraryError> {
        Ok(self.repo.update_progress(id, segment_id).await?)
    }

    /// Delete a document, returning what remains in the library.
    pub async fn delete(&self, id: &str) -> Result<Vec<Document>, LibraryError> {
        let remaining = self.repo.delete(id).await?;
        tracing::info!(document_id = %id, remaining = remaining.len(), "Deleted document");
        Ok(remaining)
    }
}
