//! Notifier settings
//!
//! User-tunable synthesis and speech parameters, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{audio, speech};
use crate::error::{CueError, Result};

/// Top-level notifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Synthesis sample rate (Hz)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default)]
    pub tone: ToneSettings,

    #[serde(default)]
    pub beat: BeatSettings,

    #[serde(default)]
    pub speech: SpeechSettings,
}

/// Tone envelope parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneSettings {
    /// Peak gain when a tone is played without a volume (0.0 - 1.0)
    #[serde(default = "default_tone_volume")]
    pub default_volume: f32,

    /// Linear attack length in seconds
    #[serde(default = "default_attack")]
    pub attack_secs: f32,

    /// Level the exponential decay reaches at the end of the tone
    #[serde(default = "default_decay_floor")]
    pub decay_floor: f32,
}

/// Binaural beat parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatSettings {
    /// Gain applied to each channel
    #[serde(default = "default_channel_gain")]
    pub channel_gain: f32,
}

/// Speech parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Master switch; when false `speak` behaves as if speech were missing
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// BCP 47 language tag for utterances
    #[serde(default = "default_language")]
    pub language: String,

    /// Utterance volume (0.0 - 1.0)
    #[serde(default = "default_speech_volume")]
    pub volume: f32,
}

fn default_sample_rate() -> u32 {
    audio::SAMPLE_RATE
}

fn default_tone_volume() -> f32 {
    audio::DEFAULT_TONE_VOLUME
}

fn default_attack() -> f32 {
    audio::TONE_ATTACK_SECS
}

fn default_decay_floor() -> f32 {
    audio::TONE_DECAY_FLOOR
}

fn default_channel_gain() -> f32 {
    audio::BEAT_CHANNEL_GAIN
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    speech::LANGUAGE.to_string()
}

fn default_speech_volume() -> f32 {
    speech::VOLUME
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            tone: ToneSettings::default(),
            beat: BeatSettings::default(),
            speech: SpeechSettings::default(),
        }
    }
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            default_volume: default_tone_volume(),
            attack_secs: default_attack(),
            decay_floor: default_decay_floor(),
        }
    }
}

impl Default for BeatSettings {
    fn default() -> Self {
        Self {
            channel_gain: default_channel_gain(),
        }
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
            volume: default_speech_volume(),
        }
    }
}

impl NotifierConfig {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the synthesizer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(CueError::Config("sample_rate must be positive".into()));
        }
        unit_range("tone.default_volume", self.tone.default_volume)?;
        if self.tone.attack_secs.is_nan() || self.tone.attack_secs < 0.0 {
            return Err(CueError::Config("tone.attack_secs must be >= 0".into()));
        }
        if self.tone.decay_floor.is_nan() || self.tone.decay_floor <= 0.0 {
            return Err(CueError::Config("tone.decay_floor must be positive".into()));
        }
        unit_range("beat.channel_gain", self.beat.channel_gain)?;
        unit_range("speech.volume", self.speech.volume)?;
        if self.speech.language.trim().is_empty() {
            return Err(CueError::Config("speech.language must not be empty".into()));
        }
        Ok(())
    }
}

fn unit_range(field: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CueError::Config(format!("{field} must be between 0.0 and 1.0")))
    }
}
