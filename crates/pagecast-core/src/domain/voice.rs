//! Voice selection types and the built-in voice catalogue.

use serde::{Deserialize, Serialize};

/// Voice gender, used for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceGender {
    Female,
    Male,
}

/// A prebuilt synthesis voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelector {
    /// Voice identifier passed to the speech service (e.g. `"Kore"`).
    pub id: String,
    /// Human-readable label.
    pub display_label: String,
    /// Gender.
    pub gender: VoiceGender,
}

impl VoiceSelector {
    pub fn new(id: impl Into<String>, display_label: impl Into<String>, gender: VoiceGender) -> Self {
        Self {
            id: id.into(),
            display_label: display_label.into(),
            gender,
        }
    }
}

/// `(id, label, gender)` for every voice the speech service offers.
pub const AVAILABLE_VOICES: &[(&str, &str, VoiceGender)] = &[
    ("Puck", "Puck (Male)", VoiceGender::Male),
    ("Kore", "Kore (Female)", VoiceGender::Female),
    ("Fenrir", "Fenrir (Male)", VoiceGender::Male),
    ("Charon", "Charon (Male)", VoiceGender::Male),
    ("Aoede", "Aoede (Female)", VoiceGender::Female),
];

/// The voice used when nothing else has been selected.
pub fn default_voice() -> VoiceSelector {
    let (id, label, gender) = AVAILABLE_VOICES[0];
    VoiceSelector::new(id, label, gender)
}

/// Look up a catalogue voice by id (case-insensitive).
pub fn find_voice(id: &str) -> Option<VoiceSelector> {
    AVAILABLE_VOICES
        .iter()
        .find(|(voice_id, _, _)| voice_id.eq_ignore_ascii_case(id.trim()))
        .map(|&(voice_id, label, gender)| VoiceSelector::new(voice_id, label, gender))
}
