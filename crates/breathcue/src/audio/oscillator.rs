//! Phase-accumulating sine oscillator

use std::f32::consts::TAU;

/// Sine oscillator stepping one sample at a time
#[derive(Debug, Clone)]
pub struct SineOscillator {
    frequency: f32,
    phase: f32,
    step: f32,
}

impl SineOscillator {
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            frequency,
            phase: 0.0,
            step: frequency / sample_rate as f32,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Next sample in -1.0..=1.0
    pub fn next_sample(&mut self) -> f32 {
        let value = (self.phase * TAU).sin();
        // Wrap to keep precision over long runs
        self.phase = (self.phase + self.step).fract();
        value
    }
}
