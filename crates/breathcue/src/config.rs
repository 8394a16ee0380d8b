//! Configuration constants for the breathcue engine

/// Synthesis defaults
pub mod audio {
    /// Sample rate of generated sources (Hz)
    pub const SAMPLE_RATE: u32 = 48_000;

    /// Peak gain used when a tone is played without an explicit volume
    pub const DEFAULT_TONE_VOLUME: f32 = 0.3;

    /// Linear attack applied to every tone (seconds)
    pub const TONE_ATTACK_SECS: f32 = 0.01;

    /// Level the exponential decay approaches by the end of a tone
    pub const TONE_DECAY_FLOOR: f32 = 0.01;

    /// Fixed gain on each binaural channel
    pub const BEAT_CHANNEL_GAIN: f32 = 0.1;
}

/// Speech defaults
pub mod speech {
    /// Language tag attached to every utterance
    pub const LANGUAGE: &str = "ar-SA";

    /// Utterance volume (0.0-1.0)
    pub const VOLUME: f32 = 0.8;

    /// espeak speaking rate at rate 1.0 (words per minute)
    pub const ESPEAK_BASE_WPM: f32 = 175.0;

    /// espeak pitch at pitch 1.0 (0-99 scale)
    pub const ESPEAK_BASE_PITCH: f32 = 50.0;

    /// Candidate espeak binaries, in order of preference
    pub const ESPEAK_BINARIES: &[&str] = &["espeak-ng", "espeak"];
}

/// Worker thread configuration
pub mod threads {
    /// Capacity of the audio output command channel
    pub const OUTPUT_CHANNEL_CAPACITY: usize = 32;

    /// Capacity of the speech command channel
    pub const SPEECH_CHANNEL_CAPACITY: usize = 64;

    /// Quiet polls after which an utterance never heard speaking is given up
    pub const SPEECH_QUIET_GRACE_POLLS: u32 = 40;

    /// How often the speech worker checks its engine for finished utterances
    pub const SPEECH_POLL_INTERVAL_MS: u64 = 50;
}
