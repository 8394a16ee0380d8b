//! Tone & speech notifier
//!
//! The public face of the crate. Owns a lazily opened audio output and an
//! optional speech worker. Nothing here returns an error: a missing device
//! or synthesizer is logged and every affected call becomes a no-op.

use std::num::NonZero;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::audio::{
    AudioBackend, AudioOutput, BinauralSource, DeviceBackend, ToneEnvelope, ToneSource, Voice,
};
use crate::config::audio::SAMPLE_RATE;
use crate::settings::NotifierConfig;
use crate::speech::{self, SpeechCompletion, SpeechService, Utterance};

const DEFAULT_SAMPLE_RATE: NonZero<u32> = NonZero::new(SAMPLE_RATE).unwrap();

/// A single tone request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency in Hz (must be positive)
    pub frequency: f32,
    pub duration: Duration,
    /// Peak gain in 0.0..=1.0; `None` uses the configured default
    pub volume: Option<f32>,
}

impl Tone {
    pub fn new(frequency: f32, duration: Duration) -> Self {
        Self {
            frequency,
            duration,
            volume: None,
        }
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Result of asking for the audio output
pub enum AudioContext<'a> {
    Ready(&'a dyn AudioOutput),
    Unavailable,
}

enum AudioState {
    /// No construction attempted yet
    Uninitialized,
    Ready(Box<dyn AudioOutput>),
    /// Construction failed; only an explicit `initialize` tries again
    Unavailable,
}

/// Plays tones, binaural beats, and spoken prompts
pub struct Notifier {
    config: NotifierConfig,
    backend: Box<dyn AudioBackend>,
    audio: AudioState,
    speech: Option<SpeechService>,
}

impl Notifier {
    /// Notifier on the default output device and platform speech engine
    pub fn new(config: NotifierConfig) -> Self {
        let speech = if config.speech.enabled {
            speech::detect()
        } else {
            None
        };
        Self::with_parts(config, Box::new(DeviceBackend), speech)
    }

    /// Notifier with an explicit audio backend and speech worker
    pub fn with_parts(
        config: NotifierConfig,
        backend: Box<dyn AudioBackend>,
        speech: Option<SpeechService>,
    ) -> Self {
        Self {
            config,
            backend,
            audio: AudioState::Uninitialized,
            speech,
        }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Open the audio output if it is not open yet.
    ///
    /// Returns whether the output is ready. Failure is logged, never raised.
    pub fn initialize(&mut self) -> bool {
        if let AudioState::Ready(_) = self.audio {
            return true;
        }
        match self.backend.open() {
            Ok(output) => {
                debug!("audio context created");
                self.audio = AudioState::Ready(output);
                true
            }
            Err(e) => {
                warn!(error = %e, "audio context unavailable; tones disabled");
                self.audio = AudioState::Unavailable;
                false
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.audio, AudioState::Ready(_))
    }

    /// The audio output, initializing on first use
    pub fn ensure_ready(&mut self) -> AudioContext<'_> {
        if let AudioState::Uninitialized = self.audio {
            self.initialize();
        }
        match &self.audio {
            AudioState::Ready(output) => AudioContext::Ready(output.as_ref()),
            _ => AudioContext::Unavailable,
        }
    }

    /// Play one enveloped sine tone.
    ///
    /// Returns as soon as the tone is scheduled; it stops on its own after
    /// `tone.duration`.
    pub fn play_tone(&mut self, tone: Tone) {
        if !is_positive(tone.frequency) || tone.duration.is_zero() {
            warn!(?tone, "ignoring tone with non-positive frequency or duration");
            return;
        }
        let volume = tone
            .volume
            .filter(|v| !v.is_nan())
            .unwrap_or(self.config.tone.default_volume);
        let envelope = ToneEnvelope::new(
            unit_gain(volume),
            self.config.tone.attack_secs,
            tone.duration.as_secs_f32(),
            self.config.tone.decay_floor,
        );
        let source = ToneSource::new(tone.frequency, tone.duration, envelope, self.sample_rate());

        if let AudioContext::Ready(output) = self.ensure_ready() {
            output.play(Voice::Tone(source));
        }
    }

    /// Play a binaural beat: `base` Hz on the left, `base + beat` Hz on the right.
    ///
    /// Both channels are stopped by a wall-clock timer after `duration`.
    pub fn play_binaural_beat(&mut self, base: f32, beat: f32, duration: Duration) {
        if !is_positive(base) || !is_positive(beat) || duration.is_zero() {
            warn!(
                base,
                beat,
                ?duration,
                "ignoring binaural beat with non-positive parameters"
            );
            return;
        }
        let source = BinauralSource::new(
            base,
            beat,
            unit_gain(self.config.beat.channel_gain),
            self.sample_rate(),
        );
        let stopper = source.stopper();

        let AudioContext::Ready(output) = self.ensure_ready() else {
            return;
        };
        output.play(Voice::Beat(source));

        let timer_stopper = stopper.clone();
        let spawned = thread::Builder::new()
            .name("beat-timer".to_string())
            .spawn(move || {
                thread::sleep(duration);
                timer_stopper.stop();
            });
        if let Err(e) = spawned {
            warn!(error = %e, "could not start beat timer; stopping beat now");
            stopper.stop();
        }
    }

    /// Speak `text` at normal rate and pitch
    pub fn speak(&self, text: &str) -> Option<SpeechCompletion> {
        self.speak_text(text, 1.0, 1.0)
    }

    /// Queue `text` on the speech synthesizer.
    ///
    /// Returns `None` without speaking when speech is unavailable or
    /// disabled. Otherwise the completion settles when this utterance ends.
    pub fn speak_text(&self, text: &str, rate: f32, pitch: f32) -> Option<SpeechCompletion> {
        if !self.config.speech.enabled {
            return None;
        }
        let speech = self.speech.as_ref()?;
        let utterance = Utterance {
            text: text.to_string(),
            language: self.config.speech.language.clone(),
            rate,
            pitch,
            volume: unit_gain(self.config.speech.volume),
        };
        Some(speech.speak(utterance))
    }

    /// Cancel the current and all queued utterances; tones are unaffected
    pub fn stop_speaking(&self) {
        if let Some(speech) = &self.speech {
            speech.stop();
        }
    }

    pub fn speech_available(&self) -> bool {
        self.config.speech.enabled && self.speech.is_some()
    }

    fn sample_rate(&self) -> NonZero<u32> {
        NonZero::new(self.config.sample_rate).unwrap_or(DEFAULT_SAMPLE_RATE)
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Clamp a gain into 0.0..=1.0; NaN is silence
fn unit_gain(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use super::*;
    use crate::error::CueError;
    use crate::speech::worker::testing::{FakeEngine, FakeState};
    use crate::speech::SpeechOutcome;

    /// Backend that counts opens and records every voice played
    #[derive(Clone, Default)]
    struct FakeBackend {
        opens: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
        voices: Arc<Mutex<Vec<Voice>>>,
    }

    struct FakeOutput {
        voices: Arc<Mutex<Vec<Voice>>>,
    }

    impl AudioOutput for FakeOutput {
        fn play(&self, voice: Voice) {
            self.voices.lock().unwrap().push(voice);
        }
    }

    impl AudioBackend for FakeBackend {
        fn open(&self) -> Result<Box<dyn AudioOutput>, CueError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(CueError::Audio("no device".into()));
            }
            Ok(Box::new(FakeOutput {
                voices: self.voices.clone(),
            }))
        }
    }

    impl FakeBackend {
        fn failing() -> Self {
            let backend = Self::default();
            backend.fail.store(true, Ordering::SeqCst);
            backend
        }

        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        fn played(&self) -> usize {
            self.voices.lock().unwrap().len()
        }
    }

    fn notifier(backend: &FakeBackend) -> Notifier {
        Notifier::with_parts(NotifierConfig::default(), Box::new(backend.clone()), None)
    }

    fn notifier_with_speech(auto_finish: bool) -> (Notifier, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let engine_state = state.clone();
        let service = SpeechService::start(move || {
            Ok(if auto_finish {
                FakeEngine::auto_finish(engine_state)
            } else {
                FakeEngine::new(engine_state)
            })
        })
        .unwrap();
        let notifier = Notifier::with_parts(
            NotifierConfig::default(),
            Box::new(FakeBackend::default()),
            Some(service),
        );
        (notifier, state)
    }

    // --- initialize ---

    #[test]
    fn starts_uninitialized() {
        let backend = FakeBackend::default();
        let notifier = notifier(&backend);
        assert!(!notifier.is_initialized());
        assert_eq!(backend.opens(), 0);
    }

    #[test]
    fn initialize_is_idempotent() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        assert!(notifier.initialize());
        assert!(notifier.initialize());
        assert!(notifier.is_initialized());
        assert_eq!(backend.opens(), 1);
    }

    #[test]
    fn failed_initialize_leaves_flag_false() {
        let backend = FakeBackend::failing();
        let mut notifier = notifier(&backend);
        assert!(!notifier.initialize());
        assert!(!notifier.is_initialized());
    }

    #[test]
    fn explicit_initialize_retries_after_failure() {
        let backend = FakeBackend::failing();
        let mut notifier = notifier(&backend);
        assert!(!notifier.initialize());
        backend.fail.store(false, Ordering::SeqCst);
        assert!(notifier.initialize());
        assert_eq!(backend.opens(), 2);
    }

    #[test]
    fn ensure_ready_initializes_lazily() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        assert!(matches!(notifier.ensure_ready(), AudioContext::Ready(_)));
        assert!(matches!(notifier.ensure_ready(), AudioContext::Ready(_)));
        assert_eq!(backend.opens(), 1);
    }

    // --- play_tone ---

    #[test]
    fn tone_initializes_and_schedules() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        notifier.play_tone(Tone::new(440.0, Duration::from_millis(200)).volume(0.5));
        assert!(notifier.is_initialized());

        let voices = backend.voices.lock().unwrap();
        let Voice::Tone(tone) = &voices[0] else {
            panic!("expected a tone");
        };
        assert_eq!(tone.frequency(), 440.0);
        assert_eq!(tone.total_samples(), 9_600);
        let env = tone.envelope();
        assert!((env.gain_at(0.01) - 0.5).abs() < 1e-4);
        assert!((env.gain_at(0.2) - 0.01).abs() < 1e-4);
    }

    #[test]
    fn tone_uses_default_volume() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        notifier.play_tone(Tone::new(440.0, Duration::from_millis(200)));
        let voices = backend.voices.lock().unwrap();
        let Voice::Tone(tone) = &voices[0] else {
            panic!("expected a tone");
        };
        assert_eq!(tone.envelope().peak(), 0.3);
    }

    #[test]
    fn tone_volume_is_clamped() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        notifier.play_tone(Tone::new(440.0, Duration::from_millis(50)).volume(3.0));
        let voices = backend.voices.lock().unwrap();
        let Voice::Tone(tone) = &voices[0] else {
            panic!("expected a tone");
        };
        assert_eq!(tone.envelope().peak(), 1.0);
    }

    #[test]
    fn configured_gains_are_clamped() {
        let backend = FakeBackend::default();
        let mut config = NotifierConfig::default();
        config.tone.default_volume = 5.0;
        config.beat.channel_gain = 4.0;
        let mut notifier = Notifier::with_parts(config, Box::new(backend.clone()), None);
        notifier.play_tone(Tone::new(440.0, Duration::from_millis(50)));
        notifier.play_binaural_beat(200.0, 10.0, Duration::from_millis(50));

        let voices = backend.voices.lock().unwrap();
        let Voice::Tone(tone) = &voices[0] else {
            panic!("expected a tone");
        };
        assert_eq!(tone.envelope().peak(), 1.0);
        let Voice::Beat(beat) = &voices[1] else {
            panic!("expected a beat");
        };
        assert_eq!(beat.gain(), 1.0);
    }

    #[test]
    fn nan_default_volume_is_silent() {
        let backend = FakeBackend::default();
        let mut config = NotifierConfig::default();
        config.tone.default_volume = f32::NAN;
        let mut notifier = Notifier::with_parts(config, Box::new(backend.clone()), None);
        notifier.play_tone(Tone::new(440.0, Duration::from_millis(50)));
        let voices = backend.voices.lock().unwrap();
        let Voice::Tone(tone) = &voices[0] else {
            panic!("expected a tone");
        };
        assert_eq!(tone.envelope().peak(), 0.0);
    }

    #[test]
    fn invalid_tone_is_ignored() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        notifier.play_tone(Tone::new(0.0, Duration::from_millis(200)));
        notifier.play_tone(Tone::new(f32::NAN, Duration::from_millis(200)));
        notifier.play_tone(Tone::new(440.0, Duration::ZERO));
        assert_eq!(backend.played(), 0);
    }

    #[test]
    fn failed_init_makes_tones_noop_without_retry() {
        let backend = FakeBackend::failing();
        let mut notifier = notifier(&backend);
        notifier.initialize();
        notifier.play_tone(Tone::new(440.0, Duration::from_millis(200)));
        notifier.play_tone(Tone::new(880.0, Duration::from_millis(200)));
        assert_eq!(backend.played(), 0);
        assert_eq!(backend.opens(), 1);
    }

    #[test]
    fn first_tone_after_failed_lazy_init_is_noop() {
        let backend = FakeBackend::failing();
        let mut notifier = notifier(&backend);
        notifier.play_tone(Tone::new(440.0, Duration::from_millis(200)));
        notifier.play_binaural_beat(200.0, 10.0, Duration::from_millis(200));
        assert_eq!(backend.played(), 0);
        assert_eq!(backend.opens(), 1);
    }

    // --- play_binaural_beat ---

    #[test]
    fn beat_channels_and_gain() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        notifier.play_binaural_beat(200.0, 10.0, Duration::from_secs(1));
        let voices = backend.voices.lock().unwrap();
        let Voice::Beat(beat) = &voices[0] else {
            panic!("expected a beat");
        };
        assert_eq!(beat.left_frequency(), 200.0);
        assert_eq!(beat.right_frequency(), 210.0);
        assert_eq!(beat.gain(), 0.1);
    }

    #[test]
    fn beat_stops_after_wall_clock_duration() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        let started = Instant::now();
        notifier.play_binaural_beat(200.0, 10.0, Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_millis(150), "call blocked");

        let stopper = match &backend.voices.lock().unwrap()[0] {
            Voice::Beat(beat) => beat.stopper(),
            Voice::Tone(_) => panic!("expected a beat"),
        };
        assert!(!stopper.is_stopped());

        let deadline = started + Duration::from_secs(2);
        while !stopper.is_stopped() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(stopper.is_stopped());
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn invalid_beat_is_ignored() {
        let backend = FakeBackend::default();
        let mut notifier = notifier(&backend);
        notifier.play_binaural_beat(-200.0, 10.0, Duration::from_secs(1));
        notifier.play_binaural_beat(200.0, 0.0, Duration::from_secs(1));
        notifier.play_binaural_beat(200.0, 10.0, Duration::ZERO);
        assert_eq!(backend.played(), 0);
        assert!(!notifier.is_initialized());
    }

    // --- speech ---

    #[test]
    fn speak_without_engine_returns_none() {
        let backend = FakeBackend::default();
        let notifier = notifier(&backend);
        assert!(!notifier.speech_available());
        assert!(notifier.speak("مرحبا").is_none());
        assert!(notifier.speak_text("مرحبا", 1.2, 0.9).is_none());
    }

    #[test]
    fn speak_disabled_by_config_returns_none() {
        let (mut notifier, state) = notifier_with_speech(true);
        notifier.config.speech.enabled = false;
        assert!(!notifier.speech_available());
        assert!(notifier.speak("مرحبا").is_none());
        notifier.stop_speaking();
        drop(notifier);
        assert!(state.lock().unwrap().spoken.is_empty());
    }

    #[test]
    fn speak_resolves_after_end_of_speech() {
        let (notifier, state) = notifier_with_speech(false);
        let done = notifier.speak("مرحبا").expect("speech available");
        assert_eq!(done.wait_timeout(Duration::from_millis(150)), None);
        state.lock().unwrap().release = 1;
        assert_eq!(done.wait(), SpeechOutcome::Finished);
    }

    #[test]
    fn speak_text_builds_utterance() {
        let (notifier, state) = notifier_with_speech(true);
        let done = notifier.speak_text("تنفس", 0.8, 1.1).unwrap();
        assert_eq!(done.wait(), SpeechOutcome::Finished);
        let spoken = state.lock().unwrap().spoken.clone();
        assert_eq!(
            spoken,
            vec![Utterance {
                text: "تنفس".to_string(),
                language: "ar-SA".to_string(),
                rate: 0.8,
                pitch: 1.1,
                volume: 0.8,
            }]
        );
    }

    #[test]
    fn speech_volume_is_clamped() {
        let (mut notifier, state) = notifier_with_speech(true);
        notifier.config.speech.volume = 3.0;
        let done = notifier.speak("مرحبا").unwrap();
        assert_eq!(done.wait(), SpeechOutcome::Finished);
        assert_eq!(state.lock().unwrap().spoken[0].volume, 1.0);
    }

    #[test]
    fn stop_speaking_cancels_queue() {
        let (notifier, _state) = notifier_with_speech(false);
        let first = notifier.speak("one").unwrap();
        let second = notifier.speak("two").unwrap();
        notifier.stop_speaking();
        assert_eq!(first.wait(), SpeechOutcome::Cancelled);
        assert_eq!(second.wait(), SpeechOutcome::Cancelled);
    }

    #[test]
    fn stop_speaking_when_idle_is_noop() {
        let backend = FakeBackend::default();
        notifier(&backend).stop_speaking();

        let (notifier, _state) = notifier_with_speech(true);
        notifier.stop_speaking();
        assert!(notifier.speech_available());
    }

    #[test]
    fn stop_speaking_leaves_beats_running() {
        let (mut notifier, _state) = notifier_with_speech(true);
        let backend = FakeBackend::default();
        notifier.backend = Box::new(backend.clone());
        notifier.play_binaural_beat(200.0, 10.0, Duration::from_secs(5));
        notifier.stop_speaking();
        let voices = backend.voices.lock().unwrap();
        let Voice::Beat(beat) = &voices[0] else {
            panic!("expected a beat");
        };
        assert!(!beat.stopper().is_stopped());
    }
}
