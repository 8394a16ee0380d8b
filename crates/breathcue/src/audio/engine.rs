//! Audio output engine
//!
//! Owns the output device on a dedicated thread and accepts voices via a
//! crossbeam channel. Each voice is added straight to the device mixer, so
//! tones and beats overlap instead of queueing behind each other.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use rodio::DeviceSinkBuilder;
use tracing::{debug, warn};

use crate::config::threads::OUTPUT_CHANNEL_CAPACITY;
use crate::error::CueError;

use super::types::{OutputCommand, Voice};

/// Audio engine that mixes voices on a dedicated thread
pub struct OutputEngine {
    cmd_tx: Sender<OutputCommand>,
    thread: Option<JoinHandle<()>>,
}

impl OutputEngine {
    /// Create a new output engine, spawning the output thread.
    ///
    /// Blocks until the audio device is opened (or fails).
    pub fn new() -> Result<Self, CueError> {
        let (cmd_tx, cmd_rx) = bounded::<OutputCommand>(OUTPUT_CHANNEL_CAPACITY);
        let (init_tx, init_rx) = bounded::<Result<(), String>>(1);

        let thread = thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || Self::run(cmd_rx, init_tx))
            .map_err(|e| CueError::Audio(format!("Failed to spawn audio thread: {}", e)))?;

        let init_result = init_rx
            .recv()
            .map_err(|_| CueError::Audio("Audio thread terminated during init".to_string()))?;

        if let Err(msg) = init_result {
            let _ = thread.join();
            return Err(CueError::Audio(msg));
        }

        debug!("audio output ready");
        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Hand a voice to the output thread
    pub fn play(&self, voice: Voice) {
        if self.cmd_tx.send(OutputCommand::Play(voice)).is_err() {
            warn!("audio output thread is gone; dropping voice");
        }
    }

    /// Graceful shutdown (consumes self)
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.cmd_tx.send(OutputCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// The engine's main loop, running on the dedicated thread
    fn run(cmd_rx: Receiver<OutputCommand>, init_tx: Sender<Result<(), String>>) {
        // Create audio output on this thread (cpal streams may be !Send)
        let mut stream = match DeviceSinkBuilder::open_default_sink() {
            Ok(s) => s,
            Err(e) => {
                let _ = init_tx.send(Err(format!("Failed to open audio output: {}", e)));
                return;
            }
        };
        stream.log_on_drop(false);

        let _ = init_tx.send(Ok(()));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                OutputCommand::Play(Voice::Tone(source)) => stream.mixer().add(source),
                OutputCommand::Play(Voice::Beat(source)) => stream.mixer().add(source),
                OutputCommand::Shutdown => break,
            }
        }
        debug!("audio output thread exiting");
    }
}

impl Drop for OutputEngine {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_opens_device_or_reports_audio_error() {
        // Headless machines have no output device; either way init settles
        match OutputEngine::new() {
            Ok(engine) => engine.shutdown(),
            Err(e) => assert!(matches!(e, CueError::Audio(_))),
        }
    }
}
