//! Core services orchestrating ports.
//!
//! Services own the application-level rules (extraction fallback, settings
//! validation) and reach storage and collaborators only through ports.

mod library;
mod progress;
mod settings_service;

pub use library::{LibraryError, LibraryService};
pub use progress::RepositoryProgressSink;
pub use settings_service::SettingsService;
