//! Play command handler.
//!
//! Opens the audio device and runs the reader, moving between the library
//! picker and documents until input is closed or the user quits.

use std::sync::Arc;

use anyhow::Result;
use pagecast_core::Document;
use pagecast_voice::{LocalPlaybackEngine, PlaybackEngine};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::{find_document, select_document};
use crate::player::input::InputReader;
use crate::player::{ReaderSession, SessionEnd};
use crate::presentation::print_library;

/// Execute the play command.
pub async fn execute(ctx: &CliContext, document: Option<String>, autoplay: bool) -> Result<()> {
    let speech = ctx.require_speech()?;
    let mut next = match document {
        Some(identifier) => Some(find_document(ctx, &identifier).await?),
        None => None,
    };

    let engine: Arc<dyn PlaybackEngine> =
        Arc::new(LocalPlaybackEngine::new().map_err(CliError::from)?);
    let mut session = ReaderSession::new(ctx, engine, speech).await?;
    let autoplay = autoplay || session.autoplay_on_open();
    let mut input = InputReader::spawn()?;

    loop {
        let document = match next.take() {
            Some(document) => document,
            None => match pick_document(ctx, &mut input).await? {
                Some(document) => document,
                None => break,
            },
        };

        match session.read(&document, autoplay, &mut input).await? {
            SessionEnd::Library => {}
            SessionEnd::Exit => break,
        }
    }

    Ok(())
}

/// Show the library and wait for a choice. `None` means quit.
async fn pick_document(ctx: &CliContext, input: &mut InputReader) -> Result<Option<Document>> {
    loop {
        let documents = ctx.library.list().await.map_err(CliError::from)?;
        if documents.is_empty() {
            println!("The library is empty. Import a document with 'pagecast import <file>'.");
            return Ok(None);
        }

        println!();
        print_library(&documents);
        println!("\nOpen a document by number, ID or title (q to quit).");

        let Some(line) = input.next_line().await else {
            return Ok(None);
        };
        let choice = line.trim();
        match choice {
            "" => {}
            "q" | "quit" | "exit" => return Ok(None),
            _ => match select_document(&documents, choice) {
                Some(document) => return Ok(Some(document.clone())),
                None => println!("No document matches '{choice}'."),
            },
        }
    }
}
