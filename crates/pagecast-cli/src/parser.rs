//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;
use pagecast_core::paths::DATA_DIR_ENV;

use crate::commands::Commands;

/// Command-line interface for the pagecast audiobook reader.
#[derive(Parser)]
#[command(name = "pagecast")]
#[command(about = "Turn PDFs into audiobooks and listen to them")]
#[command(version)]
pub struct Cli {
    /// Override the data directory (library database, settings)
    #[arg(long = "data-dir", global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Gemini API key used for speech and scanned-document extraction
    #[arg(long = "api-key", global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
