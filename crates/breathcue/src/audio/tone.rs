//! Single-tone source
//!
//! `ToneSource` is a mono `rodio::Source` that multiplies a sine oscillator by
//! a `ToneEnvelope` and ends after exactly the requested duration of samples,
//! so the stop is scheduled on the audio clock rather than a timer.

use std::num::NonZero;
use std::time::Duration;

use rodio::Source;

use super::envelope::ToneEnvelope;
use super::oscillator::SineOscillator;

const MONO: NonZero<u16> = NonZero::new(1).unwrap();

/// Enveloped sine tone of fixed length
#[derive(Debug, Clone)]
pub struct ToneSource {
    oscillator: SineOscillator,
    envelope: ToneEnvelope,
    sample_rate: NonZero<u32>,
    duration: Duration,
    position: u64,
    total_samples: u64,
}

impl ToneSource {
    pub fn new(
        frequency: f32,
        duration: Duration,
        envelope: ToneEnvelope,
        sample_rate: NonZero<u32>,
    ) -> Self {
        let total_samples = (duration.as_secs_f64() * sample_rate.get() as f64).round() as u64;
        Self {
            oscillator: SineOscillator::new(frequency, sample_rate.get()),
            envelope,
            sample_rate,
            duration,
            position: 0,
            total_samples,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.oscillator.frequency()
    }

    pub fn envelope(&self) -> &ToneEnvelope {
        &self.envelope
    }

    /// Number of samples the tone produces before stopping
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.total_samples {
            return None;
        }
        let t = self.position as f32 / self.sample_rate.get() as f32;
        self.position += 1;
        Some(self.oscillator.next_sample() * self.envelope.gain_at(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total_samples - self.position) as usize;
        (remaining, Some(remaining))
    }
}

impl Source for ToneSource {
    fn current_span_len(&self) -> Option<usize> {
        Some((self.total_samples - self.position) as usize)
    }

    fn channels(&self) -> NonZero<u16> {
        MONO
    }

    fn sample_rate(&self) -> NonZero<u32> {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration)
    }
}
