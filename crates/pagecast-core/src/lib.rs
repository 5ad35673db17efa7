#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;
pub mod text;

// Re-export commonly used types for convenience
pub use domain::{
    AVAILABLE_VOICES, Document, DocumentId, PageText, Segment, VoiceGender, VoiceSelector,
    default_voice, find_voice,
};
pub use ports::{
    CoreError, DocumentRepository, ExtractError, NoopProgressSink, ProgressSink, Repos,
    RepositoryError, SettingsRepository, SpeechError, SpeechSource, TextSource,
};
pub use services::{LibraryError, LibraryService, RepositoryProgressSink, SettingsService};
pub use settings::{Settings, SettingsError, SettingsUpdate, validate_settings};

pub use paths::{PathError, data_root, database_path};

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
