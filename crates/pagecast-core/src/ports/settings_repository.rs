//! Reader settings storage.

use async_trait::async_trait;

use super::RepositoryError;
use crate::settings::Settings;

/// Persists the single [`Settings`] record.
///
/// Settings are read and written whole; partial updates are merged by
/// [`SettingsService`](crate::SettingsService) before `save`.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// The stored settings, or `Settings::with_defaults()` on first run.
    async fn load(&self) -> Result<Settings, RepositoryError>;

    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError>;
}
