//! Audio output seam
//!
//! The notifier only talks to these traits, so the device-backed engine can
//! be swapped for an in-memory one.

use crate::error::CueError;

use super::engine::OutputEngine;
use super::types::Voice;

/// An open output that accepts voices to play
pub trait AudioOutput: Send {
    /// Queue a voice; returns once it is handed off, not when it finishes
    fn play(&self, voice: Voice);
}

/// Opens audio outputs on demand
pub trait AudioBackend: Send {
    fn open(&self) -> Result<Box<dyn AudioOutput>, CueError>;
}

/// Backend that plays through the system's default output device
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceBackend;

impl AudioBackend for DeviceBackend {
    fn open(&self) -> Result<Box<dyn AudioOutput>, CueError> {
        Ok(Box::new(OutputEngine::new()?))
    }
}

impl AudioOutput for OutputEngine {
    fn play(&self, voice: Voice) {
        OutputEngine::play(self, voice);
    }
}
