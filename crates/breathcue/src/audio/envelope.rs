//! Tone gain envelope
//!
//! Pure function of time: a linear attack from silence to the peak, then an
//! exponential approach to a small floor that lands exactly at the end of
//! the tone. No audio dependency.

/// Attack/decay envelope for a single tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEnvelope {
    peak: f32,
    attack: f32,
    duration: f32,
    floor: f32,
}

impl ToneEnvelope {
    /// Build an envelope for a tone of `duration` seconds.
    ///
    /// An attack longer than the tone is shortened to the whole tone. A NaN
    /// attack, peak or floor is treated as zero.
    pub fn new(peak: f32, attack: f32, duration: f32, floor: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            peak: peak.max(0.0),
            // `max` drops NaN where `clamp` would keep it
            attack: attack.max(0.0).min(duration),
            duration,
            floor: floor.max(f32::MIN_POSITIVE),
        }
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Gain at `t` seconds after the tone starts (0.0 outside the tone)
    pub fn gain_at(&self, t: f32) -> f32 {
        if self.peak <= 0.0 || t < 0.0 || t > self.duration {
            return 0.0;
        }
        if t < self.attack {
            return self.peak * t / self.attack;
        }
        let decay = self.duration - self.attack;
        if decay <= 0.0 {
            return self.peak;
        }
        let progress = (t - self.attack) / decay;
        self.peak * (self.floor / self.peak).powf(progress)
    }
}
