//! Document repository trait definition.
//!
//! This port defines the interface for library persistence. Implementations
//! handle all storage details internally.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::Document;

/// Repository for the document library.
///
/// # Design Rules
///
/// - Keyed by document id, last write wins
/// - No transactional guarantees across calls
/// - `list` returns the most recently saved document first
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert or replace a document.
    async fn save(&self, document: &Document) -> Result<(), RepositoryError>;

    /// List all documents, newest save first.
    async fn list(&self) -> Result<Vec<Document>, RepositoryError>;

    /// Get a document by id.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if it doesn't exist.
    async fn get(&self, id: &str) -> Result<Document, RepositoryError>;

    /// Record the last segment dispatched for playback.
    ///
    /// Unknown ids are ignored.
    async fn update_progress(&self, id: &str, segment_id: usize) -> Result<(), RepositoryError>;

    /// Delete a document and return the remaining library.
    async fn delete(&self, id: &str) -> Result<Vec<Document>, RepositoryError>;
}
