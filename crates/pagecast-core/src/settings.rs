//! Settings domain types and validation.
//!
//! This module contains the core settings types used across the application.
//! These are pure domain types with no infrastructure dependencies.

use serde::{Deserialize, Serialize};

use crate::domain::find_voice;

/// Default output volume.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Upper bound for the optional synthesis timeout.
pub const MAX_SYNTHESIS_TIMEOUT_SECS: u64 = 600;

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Voice id selected when a reader session starts.
    pub default_voice: Option<String>,

    /// Output volume (0.0–1.0).
    pub volume: Option<f32>,

    /// Give up on a synthesis request after this many seconds.
    ///
    /// `None` waits indefinitely until the user issues a new request.
    pub synthesis_timeout_secs: Option<u64>,

    /// Start playing automatically when a document is opened.
    pub autoplay_on_open: Option<bool>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            default_voice: Some("Puck".to_string()),
            volume: Some(DEFAULT_VOLUME),
            synthesis_timeout_secs: None,
            autoplay_on_open: Some(false),
        }
    }

    /// Get the effective volume (with default fallback).
    #[must_use]
    pub fn effective_volume(&self) -> f32 {
        self.volume.unwrap_or(DEFAULT_VOLUME).clamp(0.0, 1.0)
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref voice) = other.default_voice {
            self.default_voice.clone_from(voice);
        }
        if let Some(volume) = other.volume {
            self.volume = volume;
        }
        if let Some(timeout) = other.synthesis_timeout_secs {
            self.synthesis_timeout_secs = timeout;
        }
        if let Some(autoplay) = other.autoplay_on_open {
            self.autoplay_on_open = autoplay;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub default_voice: Option<Option<String>>,
    pub volume: Option<Option<f32>>,
    pub synthesis_timeout_secs: Option<Option<u64>>,
    pub autoplay_on_open: Option<Option<bool>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown voice '{0}'")]
    UnknownVoice(String),

    #[error("Volume must be between 0.0 and 1.0, got {0}")]
    InvalidVolume(f32),

    #[error("Synthesis timeout must be between 1 and {MAX_SYNTHESIS_TIMEOUT_SECS} seconds, got {0}")]
    InvalidTimeout(u64),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref voice) = settings.default_voice {
        if find_voice(voice).is_none() {
            return Err(SettingsError::UnknownVoice(voice.clone()));
        }
    }

    if let Some(volume) = settings.volume {
        if !(0.0..=1.0).contains(&volume) {
            return Err(SettingsError::InvalidVolume(volume));
        }
    }

    if let Some(timeout) = settings.synthesis_timeout_secs {
        if !(1..=MAX_SYNTHESIS_TIMEOUT_SECS).contains(&timeout) {
            return Err(SettingsError::InvalidTimeout(timeout));
        }
    }

    Ok(())
}
