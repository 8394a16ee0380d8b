//! Breathcue: audible feedback for guided health sessions
//!
//! Sine tones, binaural beat pairs, and spoken prompts.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::time::Duration;
//! use breathcue::{Notifier, NotifierConfig, Tone};
//!
//! let mut notifier = Notifier::new(NotifierConfig::default());
//! notifier.play_tone(Tone::new(440.0, Duration::from_millis(200)));
//! if let Some(done) = notifier.speak("مرحبا") {
//!     done.wait();
//! }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod notifier;
pub mod settings;
pub mod speech;

pub use error::{CueError, Result};
pub use notifier::{AudioContext, Notifier, Tone};
pub use settings::NotifierConfig;
pub use speech::{SpeechCompletion, SpeechOutcome};
