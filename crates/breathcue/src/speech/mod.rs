//! Speech subsystem
//!
//! Spoken prompts through the platform synthesizer. Speech is optional:
//! `detect` returns `None` when the platform has no usable engine.

#[cfg(target_os = "linux")]
pub mod espeak;
#[cfg(not(target_os = "linux"))]
pub mod native;
#[cfg_attr(target_os = "linux", allow(dead_code))]
pub(crate) mod quiet;
pub mod types;
pub mod worker;

use tracing::debug;

pub use types::{CompletionSender, SpeechCompletion, SpeechOutcome, Utterance};
pub use worker::{SpeechEngine, SpeechService};

/// Start the platform speech engine, if there is one
pub fn detect() -> Option<SpeechService> {
    #[cfg(target_os = "linux")]
    let started = SpeechService::start(espeak::EspeakEngine::discover);
    #[cfg(not(target_os = "linux"))]
    let started = SpeechService::start(native::NativeEngine::new);

    match started {
        Ok(service) => Some(service),
        Err(e) => {
            debug!(error = %e, "speech synthesis unavailable");
            None
        }
    }
}
