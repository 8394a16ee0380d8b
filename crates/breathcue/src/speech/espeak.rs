//! espeak speech engine (Linux)
//!
//! Speaks one utterance at a time through an `espeak-ng`/`espeak` child
//! process, keeping later utterances in a FIFO queue until the current
//! process exits.

use std::collections::VecDeque;
use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use crate::config::speech::{ESPEAK_BASE_PITCH, ESPEAK_BASE_WPM, ESPEAK_BINARIES, VOLUME};
use crate::error::CueError;

use super::types::{CompletionSender, Utterance};
use super::worker::SpeechEngine;

/// Speech engine backed by the espeak command line tool
pub struct EspeakEngine {
    binary: String,
    queue: VecDeque<(Utterance, CompletionSender)>,
    current: Option<(Child, CompletionSender)>,
}

impl EspeakEngine {
    /// Use the first espeak binary that answers `--version`
    pub fn discover() -> Result<Self, CueError> {
        ESPEAK_BINARIES
            .iter()
            .find(|bin| answers_version(bin))
            .map(|bin| {
                debug!(binary = bin, "using espeak for speech");
                Self::with_binary(*bin)
            })
            .ok_or_else(|| CueError::Speech("no espeak binary found".to_string()))
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            queue: VecDeque::new(),
            current: None,
        }
    }

    /// Command line arguments for one utterance
    pub fn args(utterance: &Utterance) -> Vec<String> {
        let wpm = (ESPEAK_BASE_WPM * finite_or(utterance.rate, 1.0))
            .round()
            .clamp(80.0, 450.0) as u32;
        let pitch = (ESPEAK_BASE_PITCH * finite_or(utterance.pitch, 1.0))
            .round()
            .clamp(0.0, 99.0) as u32;
        let amplitude = (finite_or(utterance.volume, VOLUME) * 100.0)
            .round()
            .clamp(0.0, 200.0) as u32;
        vec![
            "-v".to_string(),
            voice_for(&utterance.language),
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            "--".to_string(),
            utterance.text.clone(),
        ]
    }

    fn start_next(&mut self) {
        while self.current.is_none() {
            let Some((utterance, done)) = self.queue.pop_front() else {
                return;
            };
            let spawned = Command::new(&self.binary)
                .args(Self::args(&utterance))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
            match spawned {
                Ok(child) => self.current = Some((child, done)),
                Err(e) => {
                    warn!(error = %e, binary = %self.binary, "failed to start espeak");
                    done.cancel();
                }
            }
        }
    }
}

impl SpeechEngine for EspeakEngine {
    fn enqueue(&mut self, utterance: Utterance, done: CompletionSender) {
        self.queue.push_back((utterance, done));
        self.start_next();
    }

    fn cancel_all(&mut self) {
        if let Some((mut child, done)) = self.current.take() {
            let _ = child.kill();
            let _ = child.wait();
            done.cancel();
        }
        for (_, done) in self.queue.drain(..) {
            done.cancel();
        }
    }

    fn poll(&mut self) {
        let Some((child, _)) = self.current.as_mut() else {
            return;
        };
        let status = match child.try_wait() {
            Ok(None) => return,
            Ok(Some(status)) => Some(status),
            Err(e) => {
                warn!(error = %e, "lost track of espeak process");
                None
            }
        };
        if let Some((_, done)) = self.current.take() {
            match status {
                Some(status) if status.success() => done.finish(),
                Some(status) => {
                    debug!(%status, "espeak exited abnormally");
                    done.cancel();
                }
                None => done.cancel(),
            }
        }
        self.start_next();
    }
}

fn answers_version(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// espeak voice name for a language tag (`ar-SA` -> `ar`)
fn voice_for(language: &str) -> String {
    language
        .split(['-', '_'])
        .next()
        .unwrap_or(language)
        .to_ascii_lowercase()
}
