//! Local text extraction through poppler's `pdftotext`.
//!
//! Plain-text input skips the external tool and is split on form feeds the
//! same way `pdftotext` output is.

use std::io::Write as _;
use std::process::Stdio;

use async_trait::async_trait;
use pagecast_core::text::split_pages;
use pagecast_core::{ExtractError, PageText, TextSource};
use tokio::process::Command;

const PDF_MAGIC: &[u8] = b"%PDF";

/// [`TextSource`] that shells out to `pdftotext -layout`.
pub struct PdftotextSource {
    program: String,
}

impl Default for PdftotextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PdftotextSource {
    pub fn new() -> Self {
        Self::with_program("pdftotext")
    }

    /// Use a specific `pdftotext` binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn unavailable(&self, reason: impl Into<String>) -> ExtractError {
        ExtractError::Unavailable {
            source_name: self.program.clone(),
            reason: reason.into(),
        }
    }

    fn failed(&self, reason: impl Into<String>) -> ExtractError {
        ExtractError::Failed {
            source_name: self.program.clone(),
            reason: reason.into(),
        }
    }

    async fn run_pdftotext(&self, pdf: &[u8]) -> Result<String, ExtractError> {
        // pdftotext wants a seekable file, so the bytes go through a temp file.
        let mut input = tempfile::Builder::new()
            .prefix("pagecast-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| self.failed(format!("could not create temp file: {e}")))?;
        input
            .write_all(pdf)
            .and_then(|()| input.flush())
            .map_err(|e| self.failed(format!("could not write temp file: {e}")))?;

        let output = Command::new(&self.program)
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(input.path())
            .arg("-")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    self.unavailable("not installed (install poppler-utils)")
                }
                _ => self.unavailable(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TextSource for PdftotextSource {
    fn name(&self) -> &str {
        &self.program
    }

    async fn extract(&self, document: &[u8]) -> Result<Vec<PageText>, ExtractError> {
        let text = if document.starts_with(PDF_MAGIC) {
            self.run_pdftotext(document).await?
        } else {
            tracing::debug!("Input is not a PDF, reading it as plain text");
            String::from_utf8_lossy(document).into_owned()
        };

        let pages = split_pages(&text);
        tracing::debug!(source = %self.program, pages = pages.len(), "Extracted pages");
        Ok(pages)
    }
}
