//! Audio subsystem
//!
//! Tone and binaural beat synthesis, plus the output engine that plays them.
//!

pub mod backend;
pub mod binaural;
pub mod engine;
pub mod envelope;
pub mod oscillator;
pub mod tone;
pub mod types;

pub use backend::{AudioBackend, AudioOutput, DeviceBackend};
pub use binaural::{BeatStopper, BinauralSource};
pub use engine::OutputEngine;
pub use envelope::ToneEnvelope;
pub use oscillator::SineOscillator;
pub use tone::ToneSource;
pub use types::{OutputCommand, Voice};
