//! Interactive reader.
//!
//! A [`ReaderSession`] owns one playback sequencer for the whole
//! `pagecast play` run. Documents are loaded into it one after another as
//! the user moves between the library and the reader.

pub mod command;
pub mod display;
pub mod input;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pagecast_core::{
    AVAILABLE_VOICES, Document, RepositoryProgressSink, SettingsUpdate, SpeechSource,
    default_voice, find_voice,
};
use pagecast_voice::{
    PlaybackEngine, PlaybackError, PlaybackEvent, PlaybackSequencer, SequencerConfig,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use command::{HELP, PlayerCommand, parse_command, step_volume};
use input::InputReader;

/// How the reader was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// `q`: go back to the library.
    Library,
    /// Input closed: leave the program.
    Exit,
}

enum Step {
    Event(PlaybackEvent),
    Line(Option<String>),
}

/// Sequencer plus the reader's own state.
pub struct ReaderSession<'a> {
    ctx: &'a CliContext,
    sequencer: PlaybackSequencer,
    events: mpsc::UnboundedReceiver<PlaybackEvent>,
    volume: f32,
    autoplay_on_open: bool,
}

impl<'a> ReaderSession<'a> {
    /// Build the sequencer from stored settings.
    ///
    /// Must be called inside the Tokio runtime.
    pub async fn new(
        ctx: &'a CliContext,
        engine: Arc<dyn PlaybackEngine>,
        speech: Arc<dyn SpeechSource>,
    ) -> Result<Self> {
        let settings = ctx.settings.get().await.map_err(CliError::from)?;

        let voice = settings
            .default_voice
            .as_deref()
            .and_then(find_voice)
            .unwrap_or_else(default_voice);
        let config = SequencerConfig {
            voice,
            synthesis_timeout: settings.synthesis_timeout_secs.map(Duration::from_secs),
        };

        let progress = Arc::new(RepositoryProgressSink::new(
            ctx.repos.documents.clone(),
            Handle::current(),
        ));
        let (sequencer, events) = PlaybackSequencer::new(engine, speech, progress, config);

        let volume = settings.effective_volume();
        sequencer.set_volume(volume);

        Ok(Self {
            ctx,
            sequencer,
            events,
            volume,
            autoplay_on_open: settings.autoplay_on_open.unwrap_or(false),
        })
    }

    /// Whether documents should start playing as soon as they open.
    pub const fn autoplay_on_open(&self) -> bool {
        self.autoplay_on_open
    }

    pub const fn sequencer(&self) -> &PlaybackSequencer {
        &self.sequencer
    }

    /// Read `document` until the user leaves the reader.
    pub async fn read(
        &mut self,
        document: &Document,
        autoplay: bool,
        input: &mut InputReader,
    ) -> Result<SessionEnd> {
        self.sequencer.load_document(document);

        println!();
        println!(
            "{}",
            display::describe_opened(document, &self.sequencer.voice().display_label)
        );
        println!("Press space then Enter to play or pause, h for help.");

        if autoplay {
            report(self.sequencer.toggle_play_pause());
        }

        let end = loop {
            let step = tokio::select! {
                Some(event) = self.events.recv() => Step::Event(event),
                line = input.next_line() => Step::Line(line),
            };

            match step {
                Step::Event(event) => {
                    if let Some(line) = display::describe_event(&event, &self.sequencer) {
                        println!("{line}");
                    }
                }
                Step::Line(None) => break SessionEnd::Exit,
                Step::Line(Some(line)) => match parse_command(&line) {
                    Ok(PlayerCommand::Quit) => break SessionEnd::Library,
                    Ok(command) => self.apply(command).await,
                    Err(message) => println!("{message}"),
                },
            }
        };

        self.sequencer.unload();
        while self.events.try_recv().is_ok() {}

        tracing::debug!(document_id = %document.id, ?end, "Left reader");
        Ok(end)
    }

    async fn apply(&mut self, command: PlayerCommand) {
        let result = match command {
            PlayerCommand::TogglePlay => self.sequencer.toggle_play_pause(),
            PlayerCommand::Next => self.sequencer.next(),
            PlayerCommand::Previous => self.sequencer.previous(),
            PlayerCommand::Seek(pct) => self.sequencer.seek(pct),
            PlayerCommand::GoToPage(page) => self.sequencer.go_to_page(page),
            PlayerCommand::Jump(segment_id) => self.sequencer.play_segment(segment_id),
            PlayerCommand::Voice(name) => {
                self.change_voice(&name).await;
                Ok(())
            }
            PlayerCommand::VolumeUp | PlayerCommand::VolumeDown => {
                self.change_volume(&command).await;
                Ok(())
            }
            PlayerCommand::Status => {
                println!("{}", display::describe_status(&self.sequencer, self.volume));
                Ok(())
            }
            PlayerCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            PlayerCommand::Quit => Ok(()),
        };
        report(result);
    }

    async fn change_voice(&self, name: &str) {
        let Some(voice) = find_voice(name) else {
            let names: Vec<&str> = AVAILABLE_VOICES.iter().map(|(id, _, _)| *id).collect();
            println!("Unknown voice '{name}'. Available: {}", names.join(", "));
            return;
        };

        let label = voice.display_label.clone();
        let id = voice.id.clone();
        report(self.sequencer.change_voice(voice));
        println!("Voice: {label}");

        self.persist(SettingsUpdate {
            default_voice: Some(Some(id)),
            ..Default::default()
        })
        .await;
    }

    async fn change_volume(&mut self, command: &PlayerCommand) {
        self.volume = step_volume(self.volume, command);
        self.sequencer.set_volume(self.volume);
        println!("Volume: {:.0}%", self.volume * 100.0);

        self.persist(SettingsUpdate {
            volume: Some(Some(self.volume)),
            ..Default::default()
        })
        .await;
    }

    /// Remember a reader preference. Failures only cost the preference.
    async fn persist(&self, update: SettingsUpdate) {
        if let Err(e) = self.ctx.settings.update(update).await {
            tracing::warn!(error = %e, "Failed to save reader preference");
        }
    }
}

fn report(result: Result<(), PlaybackError>) {
    if let Err(e) = result {
        println!("! {e}");
    }
}
