//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Database pool and repositories (via pagecast-db)
//! - Text sources (local `pdftotext`, Gemini fallback)
//! - Gemini client for speech (via pagecast-gemini)
//! - Library and settings services (via pagecast-core)
//!
//! Command handlers receive the composed [`CliContext`]. Audio output is
//! not created here; only the reader opens the device.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use pagecast_core::paths::{database_path_in, resolve_data_root};
use pagecast_core::{LibraryService, Repos, SettingsService, SpeechSource, TextSource};
use pagecast_db::{RepoFactory, setup_database};
use pagecast_gemini::{DefaultGeminiClient, GeminiConfig, GeminiSpeechSource, GeminiTextSource};

use crate::error::CliError;
use crate::extract::PdftotextSource;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Data directory override; `None` uses the platform default.
    pub data_dir: Option<PathBuf>,
    /// Gemini API key.
    pub api_key: Option<String>,
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub repos: Repos,
    pub library: LibraryService,
    /// Library service without the remote fallback, for `--no-fallback`.
    pub local_library: LibraryService,
    pub settings: SettingsService,
    /// `None` when no API key is configured.
    pub speech: Option<Arc<dyn SpeechSource>>,
    pub data_root: PathBuf,
    pub database_path: PathBuf,
}

impl CliContext {
    /// The speech source, or a configuration error explaining how to get one.
    pub fn require_speech(&self) -> Result<Arc<dyn SpeechSource>, CliError> {
        self.speech.clone().ok_or_else(|| {
            CliError::Config(
                "GEMINI_API_KEY is not set; export it or pass --api-key to use the reader"
                    .to_string(),
            )
        })
    }
}

/// Bootstrap the CLI application.
///
/// Resolves the data directory, opens the database and builds the
/// services. Gemini-backed pieces are only wired when an API key is set.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let data_root = resolve_data_root(config.data_dir.as_deref()).map_err(CliError::from)?;
    let database_path = database_path_in(&data_root).map_err(CliError::from)?;
    let pool = setup_database(&database_path)
        .await
        .with_context(|| format!("opening database at {}", database_path.display()))?;
    let repos = RepoFactory::build_repos(pool);

    let gemini_config = GeminiConfig::new().with_optional_api_key(config.api_key);
    let (speech, fallback) = if gemini_config.has_api_key() {
        let client = Arc::new(DefaultGeminiClient::new(&gemini_config)?);
        let speech: Arc<dyn SpeechSource> = Arc::new(GeminiSpeechSource::new(Arc::clone(&client)));
        let fallback: Arc<dyn TextSource> = Arc::new(GeminiTextSource::new(client));
        (Some(speech), Some(fallback))
    } else {
        tracing::debug!("No Gemini API key; speech and fallback extraction disabled");
        (None, None)
    };

    Ok(bootstrap_with(
        repos,
        Arc::new(PdftotextSource::new()),
        fallback,
        speech,
        &data_root,
        database_path,
    ))
}

/// Bootstrap with custom repos and sources (for testing).
pub fn bootstrap_with(
    repos: Repos,
    primary: Arc<dyn TextSource>,
    fallback: Option<Arc<dyn TextSource>>,
    speech: Option<Arc<dyn SpeechSource>>,
    data_root: &Path,
    database_path: PathBuf,
) -> CliContext {
    let local_library = LibraryService::new(repos.documents.clone(), Arc::clone(&primary));
    let library = match fallback {
        Some(fallback) => LibraryService::new(repos.documents.clone(), primary).with_fallback(fallback),
        None => LibraryService::new(repos.documents.clone(), primary),
    };

    CliContext {
        settings: SettingsService::new(repos.settings.clone()),
        repos,
        library,
        local_library,
        speech,
        data_root: data_root.to_path_buf(),
        database_path,
    }
}
