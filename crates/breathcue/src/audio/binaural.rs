//! Binaural beat source
//!
//! Two sine oscillators merged into one interleaved stereo stream: the left
//! channel at the base frequency and the right at base + beat. The source runs
//! until its `BeatStopper` fires.

use std::num::NonZero;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::Source;

use super::oscillator::SineOscillator;

const STEREO: NonZero<u16> = NonZero::new(2).unwrap();

/// Handle that ends a running `BinauralSource`
#[derive(Debug, Clone)]
pub struct BeatStopper {
    flag: Arc<AtomicBool>,
}

impl BeatStopper {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Stereo beat pair (left = base, right = base + beat)
#[derive(Debug)]
pub struct BinauralSource {
    left: SineOscillator,
    right: SineOscillator,
    gain: f32,
    sample_rate: NonZero<u32>,
    stop: Arc<AtomicBool>,
    /// Right-channel sample still owed for the current frame
    pending_right: Option<f32>,
}

impl BinauralSource {
    pub fn new(base: f32, beat: f32, gain: f32, sample_rate: NonZero<u32>) -> Self {
        Self {
            left: SineOscillator::new(base, sample_rate.get()),
            right: SineOscillator::new(base + beat, sample_rate.get()),
            gain,
            sample_rate,
            stop: Arc::new(AtomicBool::new(false)),
            pending_right: None,
        }
    }

    pub fn left_frequency(&self) -> f32 {
        self.left.frequency()
    }

    pub fn right_frequency(&self) -> f32 {
        self.right.frequency()
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn stopper(&self) -> BeatStopper {
        BeatStopper {
            flag: self.stop.clone(),
        }
    }
}

impl Iterator for BinauralSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(right) = self.pending_right.take() {
            return Some(right);
        }
        // Only stop on a frame boundary so channels never swap
        if self.stop.load(Ordering::Relaxed) {
            return None;
        }
        self.pending_right = Some(self.right.next_sample() * self.gain);
        Some(self.left.next_sample() * self.gain)
    }
}

impl Source for BinauralSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> NonZero<u16> {
        STEREO
    }

    fn sample_rate(&self) -> NonZero<u32> {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
