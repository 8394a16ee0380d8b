//! Completions settled from a speaking/quiet signal
//!
//! For synthesizers that hand back no utterance id, the only end-of-speech
//! signal is the synthesizer going quiet. A waiting completion finishes only
//! after the synthesizer has been seen speaking and then seen quiet again.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::threads::SPEECH_QUIET_GRACE_POLLS;

use super::types::CompletionSender;

/// Completions waiting for the synthesizer to fall silent
#[derive(Debug, Default)]
pub struct QuietWatch {
    waiting: VecDeque<CompletionSender>,
    heard: bool,
    quiet_polls: u32,
}

impl QuietWatch {
    pub fn push(&mut self, done: CompletionSender) {
        if self.waiting.is_empty() {
            self.heard = false;
            self.quiet_polls = 0;
        }
        self.waiting.push_back(done);
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Feed one `is_speaking` reading
    pub fn observe(&mut self, speaking: bool) {
        if self.waiting.is_empty() {
            return;
        }
        if speaking {
            self.heard = true;
            self.quiet_polls = 0;
            return;
        }
        if self.heard {
            for done in self.waiting.drain(..) {
                done.finish();
            }
            self.heard = false;
            return;
        }
        self.quiet_polls += 1;
        if self.quiet_polls >= SPEECH_QUIET_GRACE_POLLS {
            debug!(
                count = self.waiting.len(),
                "synthesizer never started speaking; giving up"
            );
            self.cancel_all();
        }
    }

    pub fn cancel_all(&mut self) {
        for done in self.waiting.drain(..) {
            done.cancel();
        }
        self.heard = false;
        self.quiet_polls = 0;
    }
}
