//! Speech worker
//!
//! Runs a `SpeechEngine` on a dedicated thread. Engines are thread-confined
//! (platform synthesizers are often !Send), so the engine is built inside the
//! thread from a factory and driven through a crossbeam command channel.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use crate::config::threads::{SPEECH_CHANNEL_CAPACITY, SPEECH_POLL_INTERVAL_MS};
use crate::error::CueError;

use super::types::{CompletionSender, SpeechCompletion, Utterance};

/// A platform synthesizer driven by the speech worker
pub trait SpeechEngine {
    /// Queue an utterance behind any already speaking
    fn enqueue(&mut self, utterance: Utterance, done: CompletionSender);

    /// Stop the current utterance and drop everything queued
    fn cancel_all(&mut self);

    /// Called between commands to detect finished utterances
    fn poll(&mut self) {}
}

enum SpeechCommand {
    Speak(Utterance, CompletionSender),
    Stop,
    Shutdown,
}

/// Handle to the speech worker thread
pub struct SpeechService {
    cmd_tx: Sender<SpeechCommand>,
    thread: Option<JoinHandle<()>>,
}

impl SpeechService {
    /// Spawn the worker and build the engine on it.
    ///
    /// Blocks until the factory returns; its error is passed through.
    pub fn start<E, F>(factory: F) -> Result<Self, CueError>
    where
        E: SpeechEngine + 'static,
        F: FnOnce() -> Result<E, CueError> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = bounded::<SpeechCommand>(SPEECH_CHANNEL_CAPACITY);
        let (init_tx, init_rx) = bounded::<Result<(), CueError>>(1);

        let thread = thread::Builder::new()
            .name("speech".to_string())
            .spawn(move || {
                let engine = match factory() {
                    Ok(engine) => engine,
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };
                let _ = init_tx.send(Ok(()));
                Self::run(engine, cmd_rx);
            })
            .map_err(|e| CueError::Speech(format!("Failed to spawn speech thread: {}", e)))?;

        let init_result = init_rx
            .recv()
            .map_err(|_| CueError::Speech("Speech thread terminated during init".to_string()))?;

        if let Err(e) = init_result {
            let _ = thread.join();
            return Err(e);
        }

        debug!("speech worker ready");
        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Queue an utterance; the completion settles when it finishes or is cancelled
    pub fn speak(&self, utterance: Utterance) -> SpeechCompletion {
        let (done, completion) = SpeechCompletion::channel();
        // On failure the command, and with it `done`, is dropped: the caller sees Cancelled
        if self.cmd_tx.send(SpeechCommand::Speak(utterance, done)).is_err() {
            warn!("speech thread is gone; utterance dropped");
        }
        completion
    }

    /// Cancel the current and all queued utterances
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(SpeechCommand::Stop);
    }

    fn shutdown_inner(&mut self) {
        let _ = self.cmd_tx.send(SpeechCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn run<E: SpeechEngine>(mut engine: E, cmd_rx: Receiver<SpeechCommand>) {
        let poll_interval = Duration::from_millis(SPEECH_POLL_INTERVAL_MS);
        loop {
            match cmd_rx.recv_timeout(poll_interval) {
                Ok(SpeechCommand::Speak(utterance, done)) => engine.enqueue(utterance, done),
                Ok(SpeechCommand::Stop) => engine.cancel_all(),
                Ok(SpeechCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                    engine.cancel_all();
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
            engine.poll();
        }
        debug!("speech worker exiting");
    }
}

impl Drop for SpeechService {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}
