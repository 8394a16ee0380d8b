//! Native speech engine (Windows/macOS)
//!
//! Wraps the `tts` crate. Utterances are queued on the platform synthesizer
//! without interrupting, and completions are settled from its end/stop
//! callbacks, keyed by utterance id. Without an id, a completion waits for
//! the synthesizer to be seen speaking and then quiet.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use tts::{Features, Tts, UtteranceId};

use crate::error::CueError;

use super::quiet::QuietWatch;
use super::types::{CompletionSender, Utterance};
use super::worker::SpeechEngine;

type PendingMap = Arc<Mutex<Pending>>;

/// Completions waiting on platform callbacks
#[derive(Default)]
struct Pending {
    waiting: HashMap<UtteranceId, CompletionSender>,
    /// Ids whose callback fired before `speak` returned
    settled_early: HashSet<UtteranceId>,
}

impl Pending {
    fn settle(&mut self, id: UtteranceId) -> Option<CompletionSender> {
        let done = self.waiting.remove(&id);
        if done.is_none() {
            self.settled_early.insert(id);
        }
        done
    }
}

/// Speech engine backed by the platform synthesizer
pub struct NativeEngine {
    tts: Tts,
    features: Features,
    pending: PendingMap,
    /// Utterances the backend gave no id for; settled by polling `is_speaking`
    untracked: QuietWatch,
    language: Option<String>,
}

impl NativeEngine {
    pub fn new() -> Result<Self, CueError> {
        let mut tts = Tts::default().map_err(|e| CueError::Speech(e.to_string()))?;
        let features = tts.supported_features();
        if !features.utterance_callbacks && !features.is_speaking {
            return Err(CueError::Speech(
                "synthesizer reports neither utterance end nor speaking state".to_string(),
            ));
        }
        let pending: PendingMap = Arc::new(Mutex::new(Pending::default()));

        if features.utterance_callbacks {
            let ended = pending.clone();
            tts.on_utterance_end(Some(Box::new(move |id| {
                if let Some(done) = ended.lock().ok().and_then(|mut p| p.settle(id)) {
                    done.finish();
                }
            })))
            .map_err(|e| CueError::Speech(e.to_string()))?;

            let stopped = pending.clone();
            tts.on_utterance_stop(Some(Box::new(move |id| {
                if let Some(done) = stopped.lock().ok().and_then(|mut p| p.settle(id)) {
                    done.cancel();
                }
            })))
            .map_err(|e| CueError::Speech(e.to_string()))?;
        }

        Ok(Self {
            tts,
            features,
            pending,
            untracked: QuietWatch::default(),
            language: None,
        })
    }

    fn apply(&mut self, utterance: &Utterance) {
        if self.features.rate {
            let rate = scale(
                self.tts.normal_rate(),
                self.tts.min_rate(),
                self.tts.max_rate(),
                utterance.rate,
            );
            let _ = self.tts.set_rate(rate);
        }
        if self.features.pitch {
            let pitch = scale(
                self.tts.normal_pitch(),
                self.tts.min_pitch(),
                self.tts.max_pitch(),
                utterance.pitch,
            );
            let _ = self.tts.set_pitch(pitch);
        }
        if self.features.volume {
            let (min, max) = (self.tts.min_volume(), self.tts.max_volume());
            let _ = self
                .tts
                .set_volume(min + (max - min) * utterance.volume.max(0.0).min(1.0));
        }
        if self.features.voice && self.language.as_deref() != Some(utterance.language.as_str()) {
            self.select_voice(&utterance.language);
            self.language = Some(utterance.language.clone());
        }
    }

    fn select_voice(&mut self, language: &str) {
        let voices = match self.tts.voices() {
            Ok(voices) => voices,
            Err(e) => {
                debug!(error = %e, "could not list voices");
                return;
            }
        };
        let primary = language.split(['-', '_']).next().unwrap_or(language);
        let chosen = voices
            .iter()
            .find(|v| v.language().as_str().eq_ignore_ascii_case(language))
            .or_else(|| {
                voices.iter().find(|v| {
                    v.language()
                        .as_str()
                        .split(['-', '_'])
                        .next()
                        .is_some_and(|p| p.eq_ignore_ascii_case(primary))
                })
            });
        match chosen {
            Some(voice) => {
                if let Err(e) = self.tts.set_voice(voice) {
                    debug!(error = %e, language, "could not select voice");
                }
            }
            None => debug!(language, "no installed voice for language"),
        }
    }
}

impl SpeechEngine for NativeEngine {
    fn enqueue(&mut self, utterance: Utterance, done: CompletionSender) {
        // Earlier untracked utterances may already be done
        self.poll();
        self.apply(&utterance);
        match self.tts.speak(utterance.text, false) {
            Ok(Some(id)) if self.features.utterance_callbacks => {
                if let Ok(mut pending) = self.pending.lock() {
                    if pending.settled_early.remove(&id) {
                        done.finish();
                    } else {
                        pending.waiting.insert(id, done);
                    }
                }
            }
            Ok(_) if self.features.is_speaking => self.untracked.push(done),
            Ok(_) => {
                debug!("no way to tell when this utterance ends");
                done.cancel();
            }
            Err(e) => {
                warn!(error = %e, "speech synthesis failed");
                done.cancel();
            }
        }
    }

    fn cancel_all(&mut self) {
        if let Err(e) = self.tts.stop() {
            debug!(error = %e, "stop not supported");
        }
        if let Ok(mut pending) = self.pending.lock() {
            for (_, done) in pending.waiting.drain() {
                done.cancel();
            }
            pending.settled_early.clear();
        }
        self.untracked.cancel_all();
    }

    fn poll(&mut self) {
        if self.untracked.is_empty() {
            return;
        }
        let speaking = self.tts.is_speaking().unwrap_or_else(|e| {
            debug!(error = %e, "could not read speaking state");
            false
        });
        self.untracked.observe(speaking);
    }
}

/// Map a multiplier around the backend's normal value into its range
fn scale(normal: f32, min: f32, max: f32, factor: f32) -> f32 {
    let factor = if factor.is_finite() { factor } else { 1.0 };
    (normal * factor).clamp(min.min(max), max.max(min))
}
