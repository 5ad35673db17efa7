//! Line input on a dedicated thread.
//!
//! `rustyline` blocks on the terminal, so it runs on its own OS thread and
//! hands finished lines to the async side over a channel. Playback events
//! keep printing while a line is being typed.

use std::thread;

use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

const PROMPT: &str = "pagecast> ";

/// Receives lines typed at the reader prompt.
pub struct InputReader {
    lines: mpsc::UnboundedReceiver<String>,
}

impl InputReader {
    /// Start the input thread.
    pub fn spawn() -> Result<Self> {
        let (tx, lines) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("pagecast-input".into())
            .spawn(move || read_lines(&tx))
            .context("failed to spawn input thread")?;

        Ok(Self { lines })
    }

    /// Build a reader over an existing channel.
    pub const fn from_channel(lines: mpsc::UnboundedReceiver<String>) -> Self {
        Self { lines }
    }

    /// Next line, or `None` once the user closed input (Ctrl-D / Ctrl-C).
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }
}

fn read_lines(tx: &mpsc::UnboundedSender<String>) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            tracing::error!(error = %e, "Could not open line editor");
            return;
        }
    };

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Input error");
                break;
            }
        }
    }

    // Dropping `tx` closes the channel and ends the session.
    tracing::debug!("Input thread exiting");
}
