//! Text extraction port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::PageText;

/// Errors returned by a [`TextSource`].
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The extractor is not usable in this environment (missing tool, no key).
    #[error("{source_name} is unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    /// The extractor ran but could not read the document.
    #[error("{source_name} failed: {reason}")]
    Failed { source_name: String, reason: String },
}

/// Extracts ordered, page-tagged text from raw document bytes.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Extract page text in page order. Pages that cannot be read should be
    /// returned empty rather than skipped, so page numbers stay aligned.
    async fn extract(&self, document: &[u8]) -> Result<Vec<PageText>, ExtractError>;
}
