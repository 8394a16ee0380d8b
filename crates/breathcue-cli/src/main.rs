//! Breathcue CLI: play cues and run a guided breathing session

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use breathcue::{Notifier, NotifierConfig, SpeechOutcome, Tone};

/// Extra time to let the output drain before the process exits
const TAIL: Duration = Duration::from_millis(150);

#[derive(Parser)]
#[command(name = "breathcue", about = "Tone, beat and speech cues", version)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output (overrides RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a single sine tone
    Tone {
        /// Frequency in Hz
        frequency: f32,
        /// Length in seconds
        #[arg(short, long, default_value_t = 0.5)]
        duration: f32,
        /// Peak volume (0.0 - 1.0)
        #[arg(short, long)]
        volume: Option<f32>,
    },
    /// Play a binaural beat pair
    Beat {
        /// Left channel frequency in Hz
        base: f32,
        /// Right channel offset in Hz
        beat: f32,
        /// Length in seconds
        #[arg(short, long, default_value_t = 10.0)]
        duration: f32,
    },
    /// Speak text aloud
    Say {
        text: String,
        #[arg(long, default_value_t = 1.0)]
        rate: f32,
        #[arg(long, default_value_t = 1.0)]
        pitch: f32,
    },
    /// Guided breathing: a cue tone and spoken prompt for each phase
    Breathe {
        #[arg(short, long, default_value_t = 4)]
        cycles: u32,
        /// Inhale seconds
        #[arg(long, default_value_t = 4.0)]
        inhale: f32,
        /// Hold seconds
        #[arg(long, default_value_t = 4.0)]
        hold: f32,
        /// Exhale seconds
        #[arg(long, default_value_t = 6.0)]
        exhale: f32,
        /// Skip the binaural background
        #[arg(long)]
        no_beat: bool,
    },
}

/// One step of the breathing loop
struct Phase {
    prompt: &'static str,
    cue_hz: f32,
    seconds: f32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match NotifierConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not load settings");
                return ExitCode::FAILURE;
            }
        },
        None => NotifierConfig::default(),
    };

    let mut notifier = Notifier::new(config);
    if !notifier.initialize() {
        warn!("no audio output; tones and beats will be silent");
    }

    match cli.command {
        Command::Tone {
            frequency,
            duration,
            volume,
        } => {
            let Some(duration) = seconds(duration) else {
                return invalid("duration");
            };
            let mut tone = Tone::new(frequency, duration);
            if let Some(volume) = volume {
                tone = tone.volume(volume);
            }
            notifier.play_tone(tone);
            thread::sleep(duration + TAIL);
        }
        Command::Beat {
            base,
            beat,
            duration,
        } => {
            let Some(duration) = seconds(duration) else {
                return invalid("duration");
            };
            info!(left = base, right = base + beat, "playing binaural beat");
            notifier.play_binaural_beat(base, beat, duration);
            thread::sleep(duration + TAIL);
        }
        Command::Say { text, rate, pitch } => match notifier.speak_text(&text, rate, pitch) {
            Some(done) => {
                if done.wait() == SpeechOutcome::Cancelled {
                    warn!("speech was cancelled");
                }
            }
            None => {
                error!("speech synthesis is not available");
                return ExitCode::FAILURE;
            }
        },
        Command::Breathe {
            cycles,
            inhale,
            hold,
            exhale,
            no_beat,
        } => {
            let phases = [
                Phase {
                    prompt: "شهيق",
                    cue_hz: 528.0,
                    seconds: inhale,
                },
                Phase {
                    prompt: "احبس النفس",
                    cue_hz: 440.0,
                    seconds: hold,
                },
                Phase {
                    prompt: "زفير",
                    cue_hz: 396.0,
                    seconds: exhale,
                },
            ];
            if phases.iter().any(|p| seconds(p.seconds).is_none()) {
                return invalid("phase length");
            }
            breathe(&mut notifier, &phases, cycles, !no_beat);
        }
    }

    ExitCode::SUCCESS
}

fn breathe(notifier: &mut Notifier, phases: &[Phase], cycles: u32, with_beat: bool) {
    let cycle: f32 = phases.iter().map(|p| p.seconds).sum();
    if with_beat {
        // 10 Hz offset around a low carrier, for the whole session
        if let Some(session) = seconds(cycle * cycles as f32) {
            notifier.play_binaural_beat(200.0, 10.0, session);
        }
    }

    for n in 1..=cycles {
        info!(cycle = n, of = cycles, "breathing cycle");
        for phase in phases {
            notifier.play_tone(Tone::new(phase.cue_hz, Duration::from_millis(300)));
            // Prompts overlap the phase timer; never wait on them
            let _ = notifier.speak(phase.prompt);
            thread::sleep(Duration::from_secs_f32(phase.seconds));
        }
    }

    notifier.stop_speaking();
    thread::sleep(TAIL);
}

fn seconds(value: f32) -> Option<Duration> {
    if !(value.is_finite() && value > 0.0) {
        return None;
    }
    Duration::try_from_secs_f32(value).ok()
}

fn invalid(what: &str) -> ExitCode {
    error!("{what} must be a positive number of seconds");
    ExitCode::FAILURE
}

/// `--verbose` wins over RUST_LOG, which wins over the `info` default
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
