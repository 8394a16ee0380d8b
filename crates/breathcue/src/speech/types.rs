//! Speech data types

use std::cell::OnceCell;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

/// A unit of text submitted to the synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// BCP 47 language tag, e.g. `ar-SA`
    pub language: String,
    /// Speaking rate multiplier (1.0 = normal)
    pub rate: f32,
    /// Pitch multiplier (1.0 = normal)
    pub pitch: f32,
    /// Volume (0.0 - 1.0)
    pub volume: f32,
}

/// How an utterance settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// The engine reported end of speech
    Finished,
    /// Stopped, dropped from the queue, or the engine went away
    Cancelled,
}

/// Engine-side half of a completion; dropping it unsent cancels
#[derive(Debug)]
pub struct CompletionSender {
    tx: Sender<SpeechOutcome>,
}

impl CompletionSender {
    pub fn finish(self) {
        let _ = self.tx.send(SpeechOutcome::Finished);
    }

    pub fn cancel(self) {
        let _ = self.tx.send(SpeechOutcome::Cancelled);
    }
}

/// Caller-side handle that resolves when its utterance settles
#[derive(Debug)]
pub struct SpeechCompletion {
    rx: Receiver<SpeechOutcome>,
    settled: OnceCell<SpeechOutcome>,
}

impl SpeechCompletion {
    /// Create a linked sender/completion pair
    pub fn channel() -> (CompletionSender, SpeechCompletion) {
        let (tx, rx) = bounded(1);
        (
            CompletionSender { tx },
            SpeechCompletion {
                rx,
                settled: OnceCell::new(),
            },
        )
    }

    /// Block until the utterance settles
    pub fn wait(&self) -> SpeechOutcome {
        if let Some(outcome) = self.settled.get() {
            return *outcome;
        }
        let outcome = self.rx.recv().unwrap_or(SpeechOutcome::Cancelled);
        *self.settled.get_or_init(|| outcome)
    }

    /// Block for at most `timeout`; `None` if still speaking
    pub fn wait_timeout(&self, timeout: Duration) -> Option<SpeechOutcome> {
        if let Some(outcome) = self.settled.get() {
            return Some(*outcome);
        }
        let outcome = match self.rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => SpeechOutcome::Cancelled,
        };
        Some(*self.settled.get_or_init(|| outcome))
    }

    /// Non-blocking check
    pub fn try_outcome(&self) -> Option<SpeechOutcome> {
        if let Some(outcome) = self.settled.get() {
            return Some(*outcome);
        }
        let outcome = match self.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => SpeechOutcome::Cancelled,
        };
        Some(*self.settled.get_or_init(|| outcome))
    }
}
