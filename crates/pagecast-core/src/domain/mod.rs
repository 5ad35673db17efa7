//! Domain types for documents, segments and voices.
//!
//! These are pure data types with no infrastructure dependencies. Storage
//! and playback adapters consume them through the ports in
//! [`crate::ports`].

mod document;
mod voice;

pub use document::{Document, DocumentId, PageText, Segment};
pub use voice::{AVAILABLE_VOICES, VoiceGender, VoiceSelector, default_voice, find_voice};
