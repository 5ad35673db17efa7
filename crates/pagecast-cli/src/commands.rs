//! Main commands enum and subcommands.

use std::path::PathBuf;

use clap::Subcommand;

/// Available pagecast commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Extract a PDF (or plain-text file) into the library
    Import {
        /// Path to the document
        file: PathBuf,
        /// Title to store instead of the file name
        #[arg(short, long)]
        title: Option<String>,
        /// Never send the document to Gemini for extraction
        #[arg(long)]
        no_fallback: bool,
    },

    /// List documents in the library, most recent first
    List,

    /// Remove a document from the library
    Remove {
        /// Document ID or title
        document: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Open the interactive reader
    Play {
        /// Document ID or title to open directly (omit to pick from the library)
        document: Option<String>,
        /// Start playing as soon as the document opens
        #[arg(long)]
        autoplay: bool,
    },

    /// List available voices
    Voices,

    /// Show resolved data paths
    Paths,

    /// View or change reader settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Settings command variants.
#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show current settings
    Show,
    /// Update settings
    Set {
        /// Voice used when the reader starts (see `pagecast voices`)
        #[arg(long)]
        voice: Option<String>,
        /// Output volume (0.0-1.0)
        #[arg(long)]
        volume: Option<f32>,
        /// Give up on a speech request after this many seconds (1-600)
        #[arg(long, conflicts_with = "no_timeout")]
        timeout: Option<u64>,
        /// Wait for speech requests indefinitely
        #[arg(long)]
        no_timeout: bool,
        /// Start playing when a document is opened
        #[arg(long)]
        autoplay: Option<bool>,
    },
    /// Reset all settings to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
