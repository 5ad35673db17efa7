//! Dedicated audio output thread. Isolates `!Send` audio resources from the async runtime.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. Rather than using
//! `unsafe impl Send/Sync`, the stream is confined to a single OS thread and
//! every operation is sent to it as an [`AudioCommand`].
//!
//! The output device is opened lazily by the first `Unlock` (or `Play`), so
//! spawning the thread never touches audio hardware.

use std::sync::mpsc;
use std::thread;

use crate::error::PlaybackError;
use crate::pcm::PlayableBuffer;
use crate::playback::{AudioPlayback, PlaybackDoneCallback};

// ── Commands ───────────────────────────────────────────────────────

/// A command sent to the audio thread.
enum AudioCommand {
    /// Open the output device if it is not open yet.
    Unlock {
        reply: mpsc::Sender<Result<(), PlaybackError>>,
    },

    /// Replace the current buffer with `buffer`.
    Play {
        buffer: PlayableBuffer,
        on_done: PlaybackDoneCallback,
        reply: mpsc::Sender<Result<(), PlaybackError>>,
    },

    /// Stop any active playback immediately (fire-and-forget).
    Stop,

    /// Set the volume for the current and all later buffers.
    SetVolume(f32),

    /// Shut down the audio thread, releasing the device.
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the dedicated audio thread.
///
/// All methods take `&self`. Request–reply methods block the caller until
/// the audio thread responds, which is a local channel round trip plus the
/// audio operation itself.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread. The output device stays closed until
    /// [`unlock`](Self::unlock) or [`play`](Self::play).
    pub fn spawn() -> Result<Self, PlaybackError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();

        let thread = thread::Builder::new()
            .name("pagecast-audio".into())
            .spawn(move || Self::run(&cmd_rx))
            .map_err(|e| {
                PlaybackError::DeviceUnavailable(format!("failed to spawn audio thread: {e}"))
            })?;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Open the output device. Idempotent.
    pub fn unlock(&self) -> Result<(), PlaybackError> {
        self.send_and_recv(|reply| AudioCommand::Unlock { reply })
    }

    /// Play `buffer`, stopping whatever was playing.
    pub fn play(
        &self,
        buffer: PlayableBuffer,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), PlaybackError> {
        self.send_and_recv(|reply| AudioCommand::Play {
            buffer,
            on_done,
            reply,
        })
    }

    /// Stop any active playback immediately (fire-and-forget).
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(AudioCommand::Stop);
    }

    pub fn set_volume(&self, volume: f32) {
        let _ = self.cmd_tx.send(AudioCommand::SetVolume(volume));
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Send a command that expects a `Result<T, PlaybackError>` reply.
    /// Channel failures map to [`PlaybackError::AudioThreadDied`].
    fn send_and_recv<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<Result<T, PlaybackError>>) -> AudioCommand,
    ) -> Result<T, PlaybackError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(build(tx))
            .map_err(|_| PlaybackError::AudioThreadDied)?;
        rx.recv().map_err(|_| PlaybackError::AudioThreadDied)?
    }

    // ── Audio thread event loop ────────────────────────────────────

    /// Body of the audio thread. `AudioPlayback` is created and dropped
    /// here and never crosses thread boundaries.
    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>) {
        let mut playback: Option<AudioPlayback> = None;
        let mut volume = 1.0_f32;

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Unlock { reply } => {
                    let _ = reply.send(ensure_open(&mut playback, volume).map(|_| ()));
                }

                AudioCommand::Play {
                    buffer,
                    on_done,
                    reply,
                } => {
                    let result = ensure_open(&mut playback, volume)
                        .and_then(|output| output.play(buffer, on_done));
                    let _ = reply.send(result);
                }

                AudioCommand::Stop => {
                    if let Some(output) = playback.as_mut() {
                        output.stop();
                    }
                }

                AudioCommand::SetVolume(level) => {
                    volume = level.clamp(0.0, 1.0);
                    if let Some(output) = playback.as_mut() {
                        output.set_volume(volume);
                    }
                }

                AudioCommand::Shutdown => break,
            }
        }

        // `playback` is dropped here, on the audio thread.
        tracing::debug!("Audio thread shutting down");
    }
}

/// Open the output device on first use.
fn ensure_open(
    playback: &mut Option<AudioPlayback>,
    volume: f32,
) -> Result<&mut AudioPlayback, PlaybackError> {
    if playback.is_none() {
        *playback = Some(AudioPlayback::open(volume)?);
    }
    playback.as_mut().ok_or(PlaybackError::AudioThreadDied)
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        // The thread may already be dead.
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
