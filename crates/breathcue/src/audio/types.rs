//! Shared audio types
//!
//! Pure data types passed between the notifier and the output thread.

use std::fmt;

use super::binaural::BinauralSource;
use super::tone::ToneSource;

/// A sound ready to be mixed into the output
pub enum Voice {
    Tone(ToneSource),
    Beat(BinauralSource),
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Voice::Tone(tone) => f
                .debug_struct("Tone")
                .field("frequency", &tone.frequency())
                .field("samples", &tone.total_samples())
                .finish(),
            Voice::Beat(beat) => f
                .debug_struct("Beat")
                .field("left", &beat.left_frequency())
                .field("right", &beat.right_frequency())
                .finish(),
        }
    }
}

/// Commands sent to the output engine
#[derive(Debug)]
pub enum OutputCommand {
    /// Mix a voice into the output, alongside anything already playing
    Play(Voice),
    /// Shut down the output thread
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::envelope::ToneEnvelope;
    use std::num::NonZero;
    use std::time::Duration;

    #[test]
    fn voice_debug_names_frequencies() {
        let rate = NonZero::new(48_000).unwrap();
        let tone = Voice::Tone(ToneSource::new(
            440.0,
            Duration::from_millis(100),
            ToneEnvelope::new(0.3, 0.01, 0.1, 0.01),
            rate,
        ));
        let debug = format!("{:?}", tone);
        assert!(debug.contains("Tone"));
        assert!(debug.contains("440"));

        let beat = Voice::Beat(BinauralSource::new(200.0, 10.0, 0.1, rate));
        let debug = format!("{:?}", OutputCommand::Play(beat));
        assert!(debug.contains("Play"));
        assert!(debug.contains("210"));
    }

    #[test]
    fn shutdown_debug() {
        assert_eq!(format!("{:?}", OutputCommand::Shutdown), "Shutdown");
    }
}
