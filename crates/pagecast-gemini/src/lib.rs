#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;

// ============================================================================
// Public API
// ============================================================================

pub use client::{DefaultGeminiClient, GeminiClient};
pub use config::GeminiConfig;
pub use error::{GeminiError, GeminiResult};
pub use http::{GeminiBackend, ReqwestBackend};
pub use models::{GenerateContentRequest, GenerateContentResponse};
pub use port::{GeminiSpeechSource, GeminiTextSource};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
