//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx`, `reqwest` or `rodio` types in any signature
//! - Repositories are CRUD-focused
//! - Collaborators with latency (speech, extraction) are async

pub mod document_repository;
pub mod progress;
pub mod settings_repository;
pub mod speech;
pub mod text_source;

use std::sync::Arc;

use thiserror::Error;

pub use document_repository::DocumentRepository;
pub use progress::{NoopProgressSink, ProgressSink};
pub use settings_repository::SettingsRepository;
pub use speech::{SpeechError, SpeechSource};
pub use text_source::{ExtractError, TextSource};

/// Container for all repository trait objects.
///
/// Adapters build this once at startup and hand it to the services.
#[derive(Clone)]
pub struct Repos {
    /// The document library.
    pub documents: Arc<dyn DocumentRepository>,
    /// Application settings.
    pub settings: Arc<dyn SettingsRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            documents,
            settings,
        }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Core service errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),
}
